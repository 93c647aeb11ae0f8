//! OpenAI Chat Completions API driver.
//!
//! This module implements the [`LlmDriver`] trait for the OpenAI Chat Completions
//! API (`/v1/chat/completions`), requesting a streamed response and decoding
//! its SSE frames into [`LlmEvent`]s.

use futures::StreamExt;

use super::{LlmDriver, LlmEvent, LlmRequest, LlmSettings, LlmStream};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    #[must_use]
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn body(&self, req: &LlmRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "stream": true,
            "messages": req.messages,
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
            "top_p": self.settings.top_p,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<LlmStream> {
        let url = self.settings.provider.build_chat_url(&self.settings.base_url);

        let mut rb = self.http.post(&url).json(&self.body(&req));
        if let Some(k) = &self.settings.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp = rb.send().await?.error_for_status()?;
        let byte_stream = resp.bytes_stream();

        let out = async_stream::try_stream! {
            let mut framer = SseFramer::default();

            futures::pin_mut!(byte_stream);
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk?;
                for frame in framer.push(&chunk) {
                    for event in parse_frame(&frame)? {
                        yield event;
                    }
                }
            }

            // The last frame may not be followed by a blank line.
            if let Some(frame) = framer.finish() {
                for event in parse_frame(&frame)? {
                    yield event;
                }
            }
        };

        Ok(Box::pin(out))
    }
}

/// Decode one SSE frame into events.
///
/// Lines other than `data:` are ignored, as are chunks without text.
fn parse_frame(text: &str) -> anyhow::Result<Vec<LlmEvent>> {
    let mut events = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with("data:") {
            continue;
        }
        let data = line.trim_start_matches("data:").trim();

        if data == "[DONE]" {
            events.push(LlmEvent::Done);
            continue;
        }

        let v: serde_json::Value = serde_json::from_str(data)?;
        if let Some(s) = v["choices"][0]["delta"]
            .get("content")
            .and_then(|x| x.as_str())
        {
            if !s.is_empty() {
                events.push(LlmEvent::Delta(s.to_string()));
            }
        }
    }

    Ok(events)
}

/// Splits a byte stream into SSE frames.
///
/// Line endings are normalized to `\n`, so both `\n\n` and `\r\n\r\n`
/// delimit a frame.
#[derive(Debug, Default)]
struct SseFramer {
    buf: Vec<u8>,
}

impl SseFramer {
    /// Append `chunk` and return every frame it completed.
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(pos) = find_double_newline(&self.buf) {
            let frame = self.buf.drain(..pos + 2).collect::<Vec<_>>();
            frames.push(String::from_utf8_lossy(&frame).into_owned());
        }
        frames
    }

    /// Whatever is left once the stream has ended, unless it is blank.
    fn finish(self) -> Option<String> {
        let rest = String::from_utf8_lossy(&self.buf).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

/// Find the position of a double newline in the buffer.
fn find_double_newline(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Message, Provider};

    #[test]
    fn test_parse_delta_frame() {
        let frame = r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(
            parse_frame(frame).unwrap(),
            vec![LlmEvent::Delta("Hi".to_string())]
        );
    }

    #[test]
    fn test_parse_skips_empty_and_role_only_deltas() {
        let frame = concat!(
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            "\n",
            r#"data: {"choices":[{"delta":{"content":""}}]}"#,
            "\n",
            ": keep-alive comment\n",
        );
        assert!(parse_frame(frame).unwrap().is_empty());
    }

    #[test]
    fn test_parse_done() {
        assert_eq!(parse_frame("data: [DONE]").unwrap(), vec![LlmEvent::Done]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_frame("data: {not json").is_err());
    }

    #[test]
    fn test_find_double_newline() {
        assert_eq!(find_double_newline(b"data: x\n\ndata: y"), Some(7));
        assert_eq!(find_double_newline(b"data: x\n"), None);
    }

    #[test]
    fn test_framer_splits_crlf_frames() {
        let mut framer = SseFramer::default();
        let frames = framer.push(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi there!\"}}]}\r\n\r\ndata: [DONE]\r\n\r\n",
        );

        assert_eq!(frames.len(), 2);
        assert_eq!(
            parse_frame(&frames[0]).unwrap(),
            vec![LlmEvent::Delta("Hi there!".to_string())]
        );
        assert_eq!(parse_frame(&frames[1]).unwrap(), vec![LlmEvent::Done]);
        assert!(framer.finish().is_none());
    }

    #[test]
    fn test_framer_joins_split_chunks() {
        let mut framer = SseFramer::default();
        assert!(framer.push(b"data: [DO").is_empty());
        assert!(framer.push(b"NE]\r\n").is_empty());
        assert_eq!(framer.push(b"\r\n"), vec!["data: [DONE]\n\n".to_string()]);
    }

    #[test]
    fn test_framer_flushes_unterminated_frame() {
        let mut framer = SseFramer::default();
        assert!(
            framer
                .push(b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}\n")
                .is_empty()
        );

        let rest = framer.finish().unwrap();
        assert_eq!(
            parse_frame(&rest).unwrap(),
            vec![LlmEvent::Delta("tail".to_string())]
        );
    }

    #[test]
    fn test_request_body() {
        let driver = ChatCompletionsDriver::new(LlmSettings {
            base_url: "http://localhost".to_string(),
            api_key: None,
            model: "llama-3.1-8b-instant".to_string(),
            provider: Provider::Generic,
            temperature: 1.0,
            max_tokens: 1024,
            top_p: 1.0,
        });
        let body = driver.body(&LlmRequest {
            messages: vec![Message::system("Be useful."), Message::user("Hello")],
        });

        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Hello");
    }
}
