use std::fmt::{Display, Formatter, Result as FmtResult};

/// Text produced for a missing value.
pub const UNDEFINED: &str = "undefined";

/// A macro value, stringified when it is created.
///
/// Macro dictionaries only ever hold strings. `MacroValue` applies the fixed
/// conversion rules so every producer of macros renders data the same way:
/// numbers use their `Display` form, booleans become `"true"`/`"false"` and
/// missing values become [`UNDEFINED`].
///
/// # Example
///
/// ```
/// use chirp::MacroValue;
///
/// assert_eq!(MacroValue::from(3).as_str(), "3");
/// assert_eq!(MacroValue::from(true).as_str(), "true");
/// assert_eq!(MacroValue::from(None::<i64>).as_str(), "undefined");
/// assert_eq!(MacroValue::fixed(98.7654, 2).as_str(), "98.77");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroValue(String);

impl MacroValue {
    /// The value used for missing data.
    pub fn undefined() -> Self {
        MacroValue(UNDEFINED.to_string())
    }

    /// Formats a float with a fixed number of decimal places.
    pub fn fixed(value: f64, decimals: usize) -> Self {
        MacroValue(format!("{value:.decimals$}"))
    }

    /// Formats a value with a custom formatter.
    pub fn formatted<T>(value: T, format: impl FnOnce(T) -> String) -> Self {
        MacroValue(format(value))
    }

    /// Get the rendered text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this value is the missing-value sentinel.
    pub fn is_undefined(&self) -> bool {
        self.0 == UNDEFINED
    }

    /// Consume the value, returning the rendered text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for MacroValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<MacroValue> for String {
    fn from(value: MacroValue) -> Self {
        value.0
    }
}

macro_rules! display_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for MacroValue {
                fn from(value: $ty) -> Self {
                    MacroValue(value.to_string())
                }
            }
        )+
    };
}

display_value!(i32, i64, u32, u64, usize, f32, f64, bool, char, String, &str);

impl<T: Into<MacroValue>> From<Option<T>> for MacroValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(MacroValue::undefined, Into::into)
    }
}
