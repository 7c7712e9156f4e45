//! Interactive terminal front end for the video script analyzer.

pub mod command;
pub mod render;

pub use command::{Command, HELP};
pub use render::{render_snapshot, TerminalObserver, LOADING_MESSAGE};
