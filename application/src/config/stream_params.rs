//! Streaming delivery parameters.

use std::time::Duration;

/// How the streaming executor treats a slow consumer.
///
/// Publishing always blocks until the sink accepts the snapshot or the
/// request is cancelled. With `publish_timeout` set, a single publish that
/// waits longer than the timeout fails the request instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamParams {
    pub publish_timeout: Option<Duration>,
}

impl StreamParams {
    pub fn with_publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }
}
