//! Shared primitive types used across the entire engine.

/// Elapsed time in seconds (wall clock or play time).
pub type Seconds = f64;

/// A wall-clock instant in milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// A stable identifier for any catalog entry.
pub type ItemId = String;

/// The largest value any guarded accumulator may hold (2^53 − 1).
/// Every lifetime counter is clamped to this before it is stored,
/// so a snapshot never contains a non-finite or unsafe number.
pub const SAFE_VALUE_CAP: f64 = 9_007_199_254_740_991.0;
