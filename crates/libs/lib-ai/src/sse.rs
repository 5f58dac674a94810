//! # Server-Sent Events Decoding
//!
//! Incremental decoder for the `text/event-stream` bodies returned by
//! streaming chat-completion endpoints. Chunks may split lines or events at
//! any byte, so input is buffered until a blank line closes an event.

/// A decoded event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Joined `data:` lines of one event.
    Data(String),
    /// The `[DONE]` sentinel that ends an OpenAI-compatible stream.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every event it completes.
    ///
    /// Lines that are not valid UTF-8 are skipped; only `data:` fields are
    /// kept (`event:`, `id:`, `retry:` and comments are ignored).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if line.is_empty() {
                if let Some(frame) = self.flush() {
                    frames.push(frame);
                }
                continue;
            }

            let Ok(line) = std::str::from_utf8(&line) else {
                continue;
            };
            if let Some(value) = line.strip_prefix("data:") {
                let value = value.strip_prefix(' ').unwrap_or(value);
                match self.data.as_mut() {
                    Some(data) => {
                        data.push('\n');
                        data.push_str(value);
                    }
                    None => self.data = Some(value.to_string()),
                }
            }
        }

        frames
    }

    /// Emit whatever event is still pending once the body has ended.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.buf.is_empty() {
            // Unterminated final line.
            let rest = std::mem::take(&mut self.buf);
            if let Ok(line) = std::str::from_utf8(&rest) {
                if let Some(value) = line.trim_end_matches('\r').strip_prefix("data:") {
                    let value = value.strip_prefix(' ').unwrap_or(value);
                    match self.data.as_mut() {
                        Some(data) => {
                            data.push('\n');
                            data.push_str(value);
                        }
                        None => self.data = Some(value.to_string()),
                    }
                }
            }
        }
        self.flush()
    }

    fn flush(&mut self) -> Option<SseFrame> {
        let data = self.data.take()?;
        if data.trim() == "[DONE]" {
            Some(SseFrame::Done)
        } else {
            Some(SseFrame::Data(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_events_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert!(decoder.push(b":1}\r").is_empty());
        let frames = decoder.push(b"\n\r\ndata: [DONE]\n\n");
        assert_eq!(
            frames,
            vec![SseFrame::Data("{\"a\":1}".to_string()), SseFrame::Done]
        );
    }

    #[test]
    fn test_ignores_non_data_fields() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": keep-alive\nevent: message\ndata: x\n\n");
        assert_eq!(frames, vec![SseFrame::Data("x".to_string())]);
    }

    #[test]
    fn test_joins_multiline_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b"data: one\ndata: two\n\n");
        assert_eq!(frames, vec![SseFrame::Data("one\ntwo".to_string())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some(SseFrame::Data("tail".to_string())));
        assert_eq!(decoder.finish(), None);
    }
}
