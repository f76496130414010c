//! mediaprep — background metadata preparsing for media items.

pub mod config;
pub mod error;
pub mod item;
pub mod preparser;
pub mod worker;
