//! Terminal front end for the BRBT backtest client.
//!
//! - `run`: fill the form from flags, submit once, print the page
//! - `interactive`: drive the page from stdin commands

pub mod args;
pub mod interactive;
pub mod logging;
pub mod view;

pub use args::{Cli, Commands};
