//! Streaming events for incremental completions.
//!
//! [`StreamEvent`] represents individual events in a streaming completion,
//! bridging provider-level streaming (e.g. SSE chunks) to the application
//! layer.

/// An event in a streaming completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment from the model.
    Delta(String),
    /// Clean end of stream.
    Done,
    /// The provider failed mid-stream.
    Error(String),
}

impl StreamEvent {
    /// Returns the fragment if this is a `Delta` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event = StreamEvent::Delta("hello".to_string());
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_and_error_are_terminal() {
        assert!(StreamEvent::Done.is_terminal());
        assert_eq!(StreamEvent::Done.text(), None);

        let event = StreamEvent::Error("oops".to_string());
        assert!(event.is_terminal());
        assert_eq!(event.text(), None);
    }
}
