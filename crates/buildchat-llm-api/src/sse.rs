//! Incremental server-sent-events decoding for completion streams.
//!
//! Network chunks carry no alignment guarantee: an event, a line, or a
//! multi-byte character can be split anywhere. [`SseDecoder`] buffers raw
//! bytes and only decodes complete lines, which may end in `\r\n`, `\n` or
//! a bare `\r`. Neither byte occurs inside a UTF-8 multi-byte sequence, so a
//! complete line is always decodable on its own.

use async_stream::stream;
use futures::{Stream, StreamExt};

use buildchat_models::StreamChunk;
use crate::client::UpstreamError;

/// A dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one event, multiple `data:` lines joined by `\n`
    Data(String),
    /// The `[DONE]` sentinel
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
    /// Last line ended with `\r`; a leading `\n` belongs to it
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        loop {
            // the \n of a \r\n pair split across pushes
            if self.after_cr {
                match self.buffer.first() {
                    None => break,
                    Some(b'\n') => {
                        self.buffer.drain(..1);
                    }
                    Some(_) => {}
                }
                self.after_cr = false;
            }

            let Some(end) = self.buffer.iter().position(|b| *b == b'\n' || *b == b'\r') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.after_cr = line[end] == b'\r';
            let line = String::from_utf8_lossy(&line[..end]);
            self.process_line(&line, &mut events);
        }
        events
    }

    /// Flush a trailing line and any event not closed by a blank line
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        self.after_cr = false;
        if !self.buffer.is_empty() {
            let line: Vec<u8> = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&line);
            self.process_line(&line, &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<SseEvent>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }
        if line.starts_with(':') {
            return;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data_lines.push(value.to_string());
        }
        // event:, id:, retry: carry nothing the relay needs
    }

    fn dispatch(&mut self, events: &mut Vec<SseEvent>) {
        if self.data_lines.is_empty() {
            return;
        }
        let payload = self.data_lines.join("\n");
        self.data_lines.clear();
        if payload.trim() == "[DONE]" {
            events.push(SseEvent::Done);
        } else {
            events.push(SseEvent::Data(payload));
        }
    }
}

enum Step {
    Text(String),
    Skip,
    Done,
}

fn interpret(event: SseEvent) -> Result<Step, UpstreamError> {
    let payload = match event {
        SseEvent::Done => return Ok(Step::Done),
        SseEvent::Data(payload) => payload,
    };

    let value: serde_json::Value = match serde_json::from_str(&payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparseable stream event");
            return Ok(Step::Skip);
        }
    };

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(UpstreamError::Provider(message));
    }

    match serde_json::from_value::<StreamChunk>(value) {
        Ok(chunk) => match chunk.content() {
            Some(text) if !text.is_empty() => Ok(Step::Text(text.to_string())),
            _ => Ok(Step::Skip),
        },
        Err(e) => {
            tracing::warn!(error = %e, "skipping stream event with unexpected shape");
            Ok(Step::Skip)
        }
    }
}

/// Turn a provider byte stream into non-empty text deltas.
///
/// Ends at `[DONE]`, at the end of the byte stream, or after yielding the
/// first error.
pub fn content_stream<S, B>(byte_stream: S) -> impl Stream<Item = Result<String, UpstreamError>> + Send
where
    S: Stream<Item = Result<B, UpstreamError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut decoder = SseDecoder::new();
        let mut chunk_counter = 0usize;

        while let Some(next) = byte_stream.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for event in decoder.push(bytes.as_ref()) {
                match interpret(event) {
                    Ok(Step::Text(text)) => {
                        chunk_counter += 1;
                        tracing::trace!(chunk = chunk_counter, len = text.len(), "upstream delta");
                        yield Ok(text);
                    }
                    Ok(Step::Skip) => {}
                    Ok(Step::Done) => {
                        tracing::debug!(chunks = chunk_counter, "upstream stream completed");
                        return;
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        // Provider closed without [DONE]; relay whatever was left
        for event in decoder.finish() {
            match interpret(event) {
                Ok(Step::Text(text)) => yield Ok(text),
                Ok(Step::Skip) => {}
                Ok(Step::Done) => return,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
        tracing::debug!(chunks = chunk_counter, "upstream closed without [DONE]");
    }
}
