//! Infrastructure layer - concrete implementations of domain ports

pub mod generation;
pub mod output;
pub mod plugins;
pub mod shell;

pub use shell::*;
