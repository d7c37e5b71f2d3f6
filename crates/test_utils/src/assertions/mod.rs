//! Assertion utilities for testing

/// Assert that a result failed with the given stable error code
///
/// The error type must implement `atlas_types::error::ErrorCode`.
#[macro_export]
macro_rules! assert_err_code {
    ($expr:expr, $code:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err({}), got Ok: {:?}", $code, val),
            Err(err) => {
                let code = ::atlas_types::error::ErrorCode::code(&err);
                assert_eq!(code, $code, "unexpected error: {}", err);
                err
            }
        }
    };
}

/// Assert that a value is within a specific range
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $min:expr, $max:expr) => {
        assert!($value >= $min && $value <= $max, "{} not in range [{}, {}]", $value, $min, $max);
    };
    ($value:expr, $min:expr, $max:expr, $($arg:tt)+) => {
        assert!($value >= $min && $value <= $max, "{} not in range [{}, {}]: {}", $value, $min, $max, format!($($arg)+));
    };
}
