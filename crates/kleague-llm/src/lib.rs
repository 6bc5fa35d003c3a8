// Manager chat: persona prompts, session history and the streaming client.

pub mod chat;
pub mod client;
pub mod prompt;
pub mod protocol;
