// In-session manager chat.
//
// Holds the transcript in memory for the lifetime of the session and turns
// each question into one streamed request. Tokens are handed to the caller
// as they arrive; the finished answer (or the failure text) is appended to
// the transcript.

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client::LlmClient;
use crate::prompt::{system_prompt, user_prompt, ChatMessage, Persona};
use crate::protocol::LlmEvent;

const CHANNEL_CAPACITY: usize = 64;

/// Prefix of the transcript entry recorded when a request fails.
pub const FAILURE_PREFIX: &str = "전술 지시 중 오류가 발생했습니다";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Answered {
        text: String,
        input_tokens: u32,
        output_tokens: u32,
    },
    Failed { message: String },
}

impl ChatReply {
    /// Text recorded in the transcript for this reply.
    pub fn transcript_text(&self) -> String {
        match self {
            ChatReply::Answered { text, .. } => text.clone(),
            ChatReply::Failed { message } => format!("{FAILURE_PREFIX}: {message}"),
        }
    }
}

pub struct ChatSession {
    persona: Persona,
    history: Vec<ChatMessage>,
    window: usize,
    generation: u64,
}

impl ChatSession {
    /// `window` is the number of earlier messages replayed with each question.
    pub fn new(persona: Persona, window: usize) -> Self {
        ChatSession {
            persona,
            history: Vec::new(),
            window,
            generation: 0,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The last `window` messages of the transcript.
    pub fn recent_history(&self) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(self.window);
        &self.history[start..]
    }

    /// Ask one question, streaming answer fragments to `on_token`.
    ///
    /// Events tagged with an older generation are ignored. Client failures
    /// come back as `ChatReply::Failed`; `Err` is reserved for the stream
    /// task itself failing.
    pub async fn ask<F>(
        &mut self,
        client: &LlmClient,
        question: &str,
        max_tokens: u32,
        mut on_token: F,
    ) -> anyhow::Result<ChatReply>
    where
        F: FnMut(&str),
    {
        let question = question.trim();
        self.generation += 1;
        let generation = self.generation;

        let system = system_prompt(&self.persona);
        let user = user_prompt(self.recent_history(), question);
        self.history.push(ChatMessage::user(question));
        info!(generation, history = self.history.len(), "sending chat question");

        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        let send = client.stream_message(&system, &user, max_tokens, tx, generation);
        let drain = async {
            let mut reply = None;
            while let Some(event) = rx.recv().await {
                if event.generation() != generation {
                    continue;
                }
                match event {
                    LlmEvent::Token { text, .. } => on_token(&text),
                    LlmEvent::Complete {
                        full_text,
                        input_tokens,
                        output_tokens,
                        ..
                    } => {
                        reply = Some(ChatReply::Answered {
                            text: full_text,
                            input_tokens,
                            output_tokens,
                        });
                    }
                    LlmEvent::Error { message, .. } => {
                        reply = Some(ChatReply::Failed { message });
                    }
                }
            }
            reply
        };

        let (sent, reply) = tokio::join!(send, drain);
        sent.context("chat request failed")?;

        let reply = reply.unwrap_or_else(|| ChatReply::Failed {
            message: "no response received".to_string(),
        });
        if let ChatReply::Failed { message } = &reply {
            warn!(generation, message = message.as_str(), "chat reply failed");
        }
        self.history.push(ChatMessage::manager(reply.transcript_text()));
        Ok(reply)
    }
}
