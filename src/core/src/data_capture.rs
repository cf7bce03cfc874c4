//! Capture sources.
//!
//! - `capture`: the [`Capture`] trait the store calls to produce an artifact.
//! - `command_capture`: [`CommandCapture`], which shells out to a screenshot tool.

pub mod capture;
pub mod command_capture;

pub use capture::Capture;
pub use command_capture::CommandCapture;
