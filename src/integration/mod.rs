//! Integration tests driving the whole engine

pub mod e2e;
pub mod fixtures;
