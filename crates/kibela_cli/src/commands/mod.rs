//! CLI command implementations.

pub mod publish;
pub mod pull;
pub mod push;
