//! Shared testing utilities: case-report fixtures and float assertions.

pub mod fixtures;

pub use pretty_assertions::{assert_eq, assert_ne};

/// Assert two floats agree within `1e-9`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
