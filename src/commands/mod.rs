//! CLI subcommands

pub mod css;
pub mod list;
pub mod new;
pub mod preview;
pub mod show;
