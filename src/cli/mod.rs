//! CLI module
//!
//! Command-line interface for paging through collections.
//!
//! # Commands
//!
//! - `fetch` - Fetch one page and print it with its pagination status
//! - `walk` - Follow `next_page` until the last page, mirroring params into
//!   an address bar URL

mod commands;
mod runner;

pub use commands::{Cli, Commands, TargetArgs};
pub use runner::Runner;
