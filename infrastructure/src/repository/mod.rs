//! Chat store adapters.

mod json_file;
mod memory;
mod record;

pub use json_file::JsonFileChatStore;
pub use memory::InMemoryChatStore;
pub use record::{StoredChat, StoredConfig, StoredMessage};
