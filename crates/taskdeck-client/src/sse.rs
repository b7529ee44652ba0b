//! Event-stream decoder.
//!
//! Decodes the line-oriented `text/event-stream` format into logical events.
//! Recognized fields are `event`, `id` and `data`; anything else (including
//! comment lines and lines without a colon) is ignored for forward
//! compatibility. Multiple `data` lines within one event are joined with
//! `\n`, and a blank line terminates the event. A stream that ends with
//! pending data flushes it as a final event rather than dropping it.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::ClientError;

/// One decoded logical event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type label. Defaults to `message` when the stream omits the
    /// `event` field, per the event-stream convention.
    pub event: String,
    /// Event id, empty when absent.
    pub id: String,
    /// Accumulated `data` lines joined with `\n`.
    pub data: String,
}

/// Incremental decoder over any buffered byte stream.
#[derive(Debug)]
pub struct SseDecoder<R> {
    reader: R,
}

impl<R: AsyncBufRead + Unpin> SseDecoder<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Decode the next logical event, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Read`] when the underlying stream fails.
    pub async fn next_event(&mut self) -> Result<Option<SseEvent>, ClientError> {
        let mut event_type: Option<String> = None;
        let mut event_id = String::new();
        let mut data_lines: Vec<String> = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self.reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                // End of stream: flush pending data rather than drop it.
                if data_lines.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Self::finish(event_type, event_id, data_lines)));
            }

            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                if data_lines.is_empty() {
                    // Separator between unrelated blank runs.
                    continue;
                }
                return Ok(Some(Self::finish(event_type, event_id, data_lines)));
            }

            let Some(colon) = trimmed.find(':') else {
                continue;
            };
            let field = &trimmed[..colon];
            let value = trimmed[colon + 1..].strip_prefix(' ').unwrap_or(&trimmed[colon + 1..]);

            match field {
                "event" => event_type = Some(value.to_string()),
                "id" => event_id = value.to_string(),
                "data" => data_lines.push(value.to_string()),
                _ => {}
            }
        }
    }

    /// Read exactly one reply event and return its payload.
    ///
    /// The transport expects every response body to carry a single event
    /// labeled `message`; an empty stream or a differently labeled event is a
    /// protocol defect, not something to truncate silently.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] when the stream ends without an event
    /// or the event's label is not `message`.
    pub async fn read_one_message(&mut self) -> Result<String, ClientError> {
        match self.next_event().await? {
            Some(event) if event.event == "message" => Ok(event.data),
            Some(event) => Err(ClientError::Decode(format!(
                "expected a 'message' event, got '{}'",
                event.event
            ))),
            None => Err(ClientError::Decode(
                "event stream ended without a message event".to_string(),
            )),
        }
    }

    fn finish(event_type: Option<String>, id: String, data_lines: Vec<String>) -> SseEvent {
        SseEvent {
            event: event_type.unwrap_or_else(|| "message".to_string()),
            id,
            data: data_lines.join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decode_all(input: &str) -> Vec<SseEvent> {
        let mut decoder = SseDecoder::new(input.as_bytes());
        let mut events = Vec::new();
        while let Some(event) = decoder.next_event().await.unwrap() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn single_event_with_all_fields() {
        let events = decode_all("event: message\nid: 7\ndata: {\"ok\":true}\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].id, "7");
        assert_eq!(events[0].data, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn multi_line_data_joined_with_newline() {
        let events = decode_all("data: first\ndata: second\ndata: third\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "first\nsecond\nthird");
    }

    #[tokio::test]
    async fn event_type_defaults_to_message() {
        let events = decode_all("data: hello\n\n").await;
        assert_eq!(events[0].event, "message");
    }

    #[tokio::test]
    async fn blank_lines_without_data_are_separators() {
        let events = decode_all("\n\n\ndata: after\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "after");
    }

    #[tokio::test]
    async fn stream_without_data_yields_end_of_stream() {
        let events = decode_all("event: ping\n\n: comment line\n").await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn pending_data_flushed_at_end_of_stream() {
        // No terminating blank line before EOF.
        let events = decode_all("event: message\ndata: trailing").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "trailing");
    }

    #[tokio::test]
    async fn unknown_fields_and_bare_lines_ignored() {
        let events = decode_all("retry: 1000\nnot a field line\ndata: kept\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "kept");
    }

    #[tokio::test]
    async fn crlf_line_endings_accepted() {
        let events = decode_all("event: message\r\ndata: windows\r\n\r\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "windows");
    }

    #[tokio::test]
    async fn only_first_space_after_colon_stripped() {
        let events = decode_all("data:  two spaces\n\n").await;
        assert_eq!(events[0].data, " two spaces");
    }

    #[tokio::test]
    async fn multiple_events_in_sequence() {
        let events = decode_all("data: a\n\nevent: other\ndata: b\n\n").await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "a");
        assert_eq!(events[1].event, "other");
        assert_eq!(events[1].data, "b");
    }

    #[tokio::test]
    async fn read_one_message_returns_payload() {
        let mut decoder = SseDecoder::new("event: message\ndata: {\"id\":1}\n\n".as_bytes());
        assert_eq!(decoder.read_one_message().await.unwrap(), "{\"id\":1}");
    }

    #[tokio::test]
    async fn read_one_message_rejects_other_labels() {
        // Valid JSON payload does not excuse a wrong label.
        let mut decoder = SseDecoder::new("event: endpoint\ndata: {\"uri\":\"x\"}\n\n".as_bytes());
        let err = decoder.read_one_message().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn read_one_message_rejects_empty_stream() {
        let mut decoder = SseDecoder::new("".as_bytes());
        let err = decoder.read_one_message().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
