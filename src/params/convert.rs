//! Value conversion
//!
//! Converters turn one raw string into a typed value or a human-readable
//! reason why they could not. The resolution lifecycle attributes the reason
//! to the option or argument being finalized.

use std::sync::Arc;

/// Converts a single raw value
pub type Converter<T> = Arc<dyn Fn(&str) -> Result<T, String> + Send + Sync>;

/// Identity conversion
pub fn string() -> Converter<String> {
    Arc::new(|value: &str| Ok(value.to_string()))
}

/// Signed 64-bit integer
pub fn int() -> Converter<i64> {
    Arc::new(|value: &str| {
        value
            .parse::<i64>()
            .map_err(|_| format!("{} is not a valid integer", value))
    })
}

/// 64-bit float
pub fn float() -> Converter<f64> {
    Arc::new(|value: &str| {
        value
            .parse::<f64>()
            .map_err(|_| format!("{} is not a valid floating point value", value))
    })
}

/// One of a fixed set of strings
pub fn choice(choices: Vec<String>) -> Converter<String> {
    Arc::new(move |value: &str| {
        if choices.iter().any(|c| c == value) {
            Ok(value.to_string())
        } else {
            Err(format!(
                "invalid choice: {}. (choose from {})",
                value,
                choices.join(", ")
            ))
        }
    })
}

/// Chains a follow-up conversion onto an existing converter
pub fn map<T, U, F>(first: Converter<T>, then: F) -> Converter<U>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
{
    Arc::new(move |value: &str| first(value).and_then(&then))
}
