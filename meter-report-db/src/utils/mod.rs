use heapless::String as HeaplessString;
use std::str::FromStr;

/// A value that does not fit the bounded column it is destined for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Value for field '{field}' is too long (max {max} chars)")]
pub struct BoundedStringError {
    pub field: &'static str,
    pub max: usize,
}

/// Copies `value` into a fixed-capacity string, naming `field` on overflow.
pub fn bounded<const N: usize>(
    value: &str,
    field: &'static str,
) -> Result<HeaplessString<N>, BoundedStringError> {
    HeaplessString::from_str(value).map_err(|_| BoundedStringError { field, max: N })
}

/// Optional variant of [`bounded`].
pub fn bounded_opt<const N: usize>(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<HeaplessString<N>>, BoundedStringError> {
    value.map(|v| bounded(v, field)).transpose()
}
