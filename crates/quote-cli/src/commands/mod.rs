//! Subcommand implementations.

pub mod center;
pub mod info;
pub mod materials;
pub mod price;
