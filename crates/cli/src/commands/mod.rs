//! CLI subcommands.

pub mod images;
pub mod migrate;
