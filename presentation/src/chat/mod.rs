//! Interactive chat module
//!
//! Provides the single-turn runner and a line-editor chat loop on top of it.

mod repl;
mod runner;

pub use repl::ChatRepl;
pub use runner::ChatRunner;
