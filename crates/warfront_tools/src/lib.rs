//! # Warfront Development Tools
//!
//! Command-line tools for development:
//! - Scenario validation
//! - Headless scripted play that emits the combat log

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod loader;
pub mod play;
pub mod validate;

pub use error::{Result, ToolError};
