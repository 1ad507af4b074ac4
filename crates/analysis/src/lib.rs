//! Pure content-analysis engines for the editorial pipeline.
//!
//! Everything in this crate is a synchronous function of its string/struct
//! inputs: link classification, publish-readiness quality checks, word-level
//! diffing, and revision validation. No I/O and no shared state, so callers
//! are free to recompute on every content change.

pub mod diff;
pub mod links;
pub mod quality;
pub mod text;
pub mod validate;
