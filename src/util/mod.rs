//! Small shared utilities.

/// Smoothed frame-rate tracking.
pub mod frame_timing;
