// Streaming chat client for the Anthropic Messages API.
//
// A manager reply is requested with `stream: true`; text deltas are
// forwarded as `LlmEvent::Token` while the reply grows, then a single
// `Complete` or `Error` closes it. Every event carries the chat turn's
// generation.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use kleague_core::config::Config;

use crate::protocol::LlmEvent;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Stream events
// ---------------------------------------------------------------------------

/// The parts of a Messages stream the chat cares about.
#[derive(Debug, Clone, PartialEq)]
enum StreamEvent {
    Started { input_tokens: Option<u32> },
    Text(String),
    Usage { output_tokens: u32 },
    Stop,
    Ignored,
}

fn parse_stream_event(name: &str, data: &str) -> StreamEvent {
    let json = || serde_json::from_str::<Value>(data).ok();
    let count = |v: &Value| v.as_u64().and_then(|n| u32::try_from(n).ok());
    match name {
        "message_start" => StreamEvent::Started {
            input_tokens: json().and_then(|v| count(&v["message"]["usage"]["input_tokens"])),
        },
        "content_block_delta" => json()
            .and_then(|v| v["delta"]["text"].as_str().map(str::to_string))
            .map_or(StreamEvent::Ignored, StreamEvent::Text),
        "message_delta" => json()
            .and_then(|v| count(&v["usage"]["output_tokens"]))
            .map_or(StreamEvent::Ignored, |output_tokens| StreamEvent::Usage { output_tokens }),
        "message_stop" => StreamEvent::Stop,
        _ => StreamEvent::Ignored,
    }
}

/// Reply text and token usage gathered while streaming.
#[derive(Debug, Default)]
struct Reply {
    text: String,
    input_tokens: u32,
    output_tokens: u32,
}

impl Reply {
    fn complete(self, generation: u64) -> LlmEvent {
        LlmEvent::Complete {
            full_text: self.text,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            generation,
        }
    }
}

fn describe_stream_error(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => format!("Network error: {e}"),
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

pub struct ClaudeClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_endpoint(ANTHROPIC_API_URL.to_string(), api_key, model)
    }

    /// Posts to `endpoint` instead of the public API.
    pub fn with_endpoint(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    /// Ask for one manager reply. Problems surface as an `Error` event, so
    /// this only returns once the reply is finished or `tx` is closed.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        let fail = |message: String| LlmEvent::Error { message, generation };

        if self.api_key.is_empty() {
            let _ = tx.send(fail("API key not configured".into())).await;
            return Ok(());
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });
        let request = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx.send(fail(format!("Failed to create event source: {e}"))).await;
                return Ok(());
            }
        };

        let mut reply = Reply::default();
        while let Some(event) = es.next().await {
            let msg = match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(msg)) => msg,
                Err(err) => {
                    warn!(?err, "manager reply stream failed");
                    let _ = tx.send(fail(describe_stream_error(&err))).await;
                    es.close();
                    return Ok(());
                }
            };
            match parse_stream_event(&msg.event, &msg.data) {
                StreamEvent::Started { input_tokens } => match input_tokens {
                    Some(n) => reply.input_tokens = n,
                    None => warn!("message_start without input token count"),
                },
                StreamEvent::Text(text) => {
                    reply.text.push_str(&text);
                    if tx.send(LlmEvent::Token { text, generation }).await.is_err() {
                        es.close();
                        return Ok(());
                    }
                }
                StreamEvent::Usage { output_tokens } => reply.output_tokens = output_tokens,
                StreamEvent::Stop => {
                    debug!(
                        input_tokens = reply.input_tokens,
                        output_tokens = reply.output_tokens,
                        chars = reply.text.chars().count(),
                        "manager reply finished"
                    );
                    let _ = tx.send(reply.complete(generation)).await;
                    es.close();
                    return Ok(());
                }
                StreamEvent::Ignored => {}
            }
        }

        // Closed early: keep whatever text arrived.
        let last = if reply.text.is_empty() {
            fail("Stream ended unexpectedly without any content".into())
        } else {
            reply.complete(generation)
        };
        let _ = tx.send(last).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LlmClient
// ---------------------------------------------------------------------------

/// The chat's model backend; `Disabled` answers every request with an error.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    /// `Active` only with a non-empty API key in credentials.toml.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => {
                LlmClient::Active(ClaudeClient::new(key.clone(), config.llm.model.clone()))
            }
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        match self {
            LlmClient::Active(client) => {
                client
                    .stream_message(system, user_content, max_tokens, tx, generation)
                    .await
            }
            LlmClient::Disabled => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: "LLM not configured".to_string(),
                        generation,
                    })
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
