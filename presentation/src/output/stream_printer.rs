//! Terminal rendering of cumulative stream snapshots.

use chatservice_application::ChatCompletionOutput;
use std::io::Write;
use tokio::sync::mpsc;

/// Turns cumulative snapshots back into the text not yet shown.
///
/// Each snapshot carries the whole reply so far, so only the part past what
/// was already printed is written.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    printed: String,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of `snapshot` that has not been printed yet.
    ///
    /// A snapshot that does not extend the printed text is returned whole,
    /// on a fresh line.
    pub fn advance(&mut self, snapshot: &str) -> String {
        let suffix = match snapshot.strip_prefix(self.printed.as_str()) {
            Some(rest) => rest.to_string(),
            None => format!("\n{}", snapshot),
        };
        self.printed = snapshot.to_string();
        suffix
    }

    /// Everything shown so far.
    pub fn printed(&self) -> &str {
        &self.printed
    }

    /// Consume snapshots until the sender side is dropped, writing each new
    /// suffix to `out` as it arrives.
    pub async fn run<W: Write>(
        mut self,
        mut rx: mpsc::Receiver<ChatCompletionOutput>,
        mut out: W,
    ) -> String {
        while let Some(snapshot) = rx.recv().await {
            let suffix = self.advance(&snapshot.content);
            let _ = out.write_all(suffix.as_bytes());
            let _ = out.flush();
        }
        self.printed
    }
}
