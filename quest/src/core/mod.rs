//! Deterministic, pure logic for the quest.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod collector;
pub mod feedback;
pub mod machine;
pub mod record;
pub mod step;
