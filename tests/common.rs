//! Test utilities for spelunk integration tests

use spelunk::Value;

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Decode a YAML literal into a document value
pub fn yaml(input: &str) -> Value {
    serde_yaml::from_str(input).expect("test document must be valid YAML")
}

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract the error or panic, asserting its kind
#[macro_export]
macro_rules! assert_kind {
    ($expr:expr, $kind:expr) => {
        match $expr {
            Err(e) => {
                assert_eq!(e.kind(), $kind, "unexpected error kind for {}", e);
                e
            }
            Ok(_) => panic!("assertion failed: expected Err({:?}), got Ok", $kind),
        }
    };
}
