//! Error types and utilities.

pub use anyhow::Error;

/// Either `Ok(T)` or `Err(anyhow::Error)`.
///
/// Every failure in this crate is fatal to the current function body's
/// encoding: a branch that names no live label, an index that was never
/// assigned, a structural marker with nothing to close. None of them are
/// recoverable, so errors only carry enough context to point at the
/// offending input.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
