//! Output formatting

pub mod console;
pub mod stream_printer;
