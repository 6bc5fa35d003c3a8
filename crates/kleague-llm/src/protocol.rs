// Events emitted by the streaming LLM client.

/// One step of a streamed model response. `generation` identifies the
/// request so a consumer can drop events from a superseded turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmEvent {
    /// A fragment of response text.
    Token { text: String, generation: u64 },
    /// The response finished; `full_text` is every token concatenated.
    Complete {
        full_text: String,
        input_tokens: u32,
        output_tokens: u32,
        generation: u64,
    },
    /// The request failed or the client is not configured.
    Error { message: String, generation: u64 },
}

impl LlmEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LlmEvent::Token { generation, .. }
            | LlmEvent::Complete { generation, .. }
            | LlmEvent::Error { generation, .. } => *generation,
        }
    }
}
