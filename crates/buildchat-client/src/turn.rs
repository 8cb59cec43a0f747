use buildchat_models::ExtractedFile;

use crate::decoder::Utf8ChunkDecoder;
use crate::extract::extract_files;

/// Lifecycle of one assistant reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Streaming,
    Complete,
    /// Reason shown next to whatever text had arrived
    Failed(String),
}

/// One assistant reply being received from the proxy
#[derive(Debug)]
pub struct AssistantTurn {
    state: TurnState,
    decoder: Utf8ChunkDecoder,
    text: String,
    chunks: usize,
    files: Vec<ExtractedFile>,
}

impl Default for AssistantTurn {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantTurn {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            decoder: Utf8ChunkDecoder::new(),
            text: String::new(),
            chunks: 0,
            files: Vec::new(),
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of body chunks received
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Files found by the extraction pass; empty until `complete`
    pub fn files(&self) -> &[ExtractedFile] {
        &self.files
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TurnState::Complete | TurnState::Failed(_))
    }

    /// Idle -> Streaming. No effect in any other state.
    pub fn start(&mut self) {
        if self.state == TurnState::Idle {
            self.state = TurnState::Streaming;
        }
    }

    /// Append a body chunk, returning the newly decodable text.
    ///
    /// Bytes arriving after the turn finished are ignored.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &str {
        if self.is_finished() {
            return "";
        }
        self.start();
        self.chunks += 1;

        let start = self.text.len();
        let decoded = self.decoder.push(bytes);
        self.text.push_str(&decoded);
        &self.text[start..]
    }

    /// The stream ended cleanly: flush and run extraction over the full text
    pub fn complete(&mut self) -> &[ExtractedFile] {
        if !self.is_finished() {
            let tail = self.decoder.finish();
            self.text.push_str(&tail);
            self.files = extract_files(&self.text);
            self.state = TurnState::Complete;
        }
        &self.files
    }

    /// The stream broke off. Accumulated text is kept; nothing is extracted.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.is_finished() {
            let tail = self.decoder.finish();
            self.text.push_str(&tail);
            self.state = TurnState::Failed(reason.into());
        }
    }

    /// The caller abandoned the request
    pub fn cancel(&mut self) {
        self.fail("cancelled");
    }
}
