//! Utility modules shared by the engine and the CLI.

pub mod html;
mod plural;

pub use plural::{plural_count, plural_s};
