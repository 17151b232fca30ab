//! Streaming configuration from TOML (`[stream]` section)

use chatservice_application::StreamParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStreamConfig {
    /// Capacity of the snapshot channel between executor and consumer.
    pub buffer: usize,
    /// Fail the request when one snapshot waits longer than this.
    /// Unset means wait until the request is cancelled.
    pub publish_timeout_ms: Option<u64>,
}

impl Default for FileStreamConfig {
    fn default() -> Self {
        Self {
            buffer: 32,
            publish_timeout_ms: None,
        }
    }
}

impl FileStreamConfig {
    pub fn to_stream_params(&self) -> StreamParams {
        StreamParams::default()
            .with_publish_timeout(self.publish_timeout_ms.map(Duration::from_millis))
    }
}
