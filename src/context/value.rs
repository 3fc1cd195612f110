// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renderable context values.

use std::borrow::Cow;
use std::fmt::Display;

/// A context value, already rendered to text.
///
/// Conversions exist for strings, integers, floats, booleans and chars. Anything else that
/// implements [`Display`] goes through [`ContextValue::display`]. Rendering happens at
/// conversion time, so the value never aliases the caller's data.
///
/// ```
/// use ctxlog::context::ContextValue;
///
/// assert_eq!(ContextValue::from(2).as_str(), "2");
/// assert_eq!(ContextValue::from(3.0).as_str(), "3");
/// assert_eq!(ContextValue::from(true).as_str(), "true");
/// assert_eq!(ContextValue::display(&std::net::Ipv4Addr::LOCALHOST).as_str(), "127.0.0.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextValue(String);

impl ContextValue {
    /// Renders any displayable value.
    pub fn display<T: Display + ?Sized>(value: &T) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<Cow<'_, str>> for ContextValue {
    fn from(value: Cow<'_, str>) -> Self {
        Self(value.into_owned())
    }
}

impl From<&ContextValue> for ContextValue {
    fn from(value: &ContextValue) -> Self {
        value.clone()
    }
}

macro_rules! display_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ContextValue {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

// float Display prints the shortest form that round-trips, so 3.0 renders as "3"
display_conversions!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        assert_eq!(ContextValue::from(2).as_str(), "2");
        assert_eq!(ContextValue::from(-7i64).as_str(), "-7");
        assert_eq!(ContextValue::from(3.0).as_str(), "3");
        assert_eq!(ContextValue::from(2.5f32).as_str(), "2.5");
        assert_eq!(ContextValue::from(true).as_str(), "true");
        assert_eq!(ContextValue::from('x').as_str(), "x");
        assert_eq!(ContextValue::from("value1").as_str(), "value1");
    }

    #[test]
    fn test_rendering_is_eager() {
        let mut source = String::from("before");
        let value = ContextValue::from(&source);
        source.push_str(" and after");
        assert_eq!(value.as_str(), "before");
    }

    #[test]
    fn test_display_constructor() {
        let err = std::io::Error::other("disk full");
        assert_eq!(ContextValue::display(&err).into_string(), "disk full");
    }
}
