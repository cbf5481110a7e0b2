//! HTTP handlers.

pub mod health;
pub mod process;

pub use health::{health, root};
pub use process::process_video;
