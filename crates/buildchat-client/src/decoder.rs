use std::char::REPLACEMENT_CHARACTER;

/// Decodes UTF-8 text from byte chunks split at arbitrary offsets.
///
/// An incomplete sequence at the end of a chunk is held back until the next
/// chunk completes it. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus held-back bytes) as forms whole characters
    pub fn push(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&rest[..valid]) {
                        out.push_str(text);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // truncated sequence at the end: wait for more bytes
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// True while a partial character is held back
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// End of input: a dangling partial character becomes U+FFFD
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT_CHARACTER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.push(b"hello"), "hello");
        assert!(!decoder.has_pending());
    }

    #[test]
    fn test_every_split_point_reassembles() {
        let text = "naïve ✨ 日本語 🚀 done";
        let bytes = text.as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = Utf8ChunkDecoder::new();
            let mut out = decoder.push(&bytes[..split]);
            out.push_str(&decoder.push(&bytes[split..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, text, "split at byte {}", split);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let text = "🚀→é";
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        for b in text.as_bytes() {
            out.push_str(&decoder.push(std::slice::from_ref(b)));
        }
        assert_eq!(out, text);
    }

    #[test]
    fn test_invalid_byte_replaced_and_decoding_continues() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.push(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn test_finish_flushes_truncated_sequence() {
        let mut decoder = Utf8ChunkDecoder::new();
        // first two bytes of a four-byte emoji
        assert_eq!(decoder.push(&"🚀".as_bytes()[..2]), "");
        assert!(decoder.has_pending());
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
