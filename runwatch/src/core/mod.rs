//! Deterministic, pure logic for run status derivation.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests. The
//! only clock reads are the wall-clock convenience wrappers
//! ([`report::report_age`], [`report::RunnerReport::initial`]), each of which
//! has a clock-injected counterpart.

pub mod derive;
pub mod metadata;
pub mod report;
pub mod stall;
pub mod types;
