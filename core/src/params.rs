//! Default-suppressing query parameter set.
//!
//! # Design
//! Every operation builds a `ParameterSet` and nothing else decides what
//! goes on the wire. A value is converted through `ParamValue`, which
//! returns `None` for "absent" (null or empty). `add_with_default` also
//! drops a value equal to its declared default, so the API applies its own
//! server-side default and requests stay minimal.

use chrono::{DateTime, Utc};

/// A value that can be rendered as a query parameter.
///
/// `None` means the parameter is absent and must not be sent.
pub trait ParamValue {
    fn to_param(&self) -> Option<String>;
}

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> Option<String> {
        (**self).to_param()
    }
}

impl ParamValue for str {
    fn to_param(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl ParamValue for String {
    fn to_param(&self) -> Option<String> {
        self.as_str().to_param()
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> Option<String> {
        self.as_ref().and_then(ParamValue::to_param)
    }
}

impl ParamValue for bool {
    fn to_param(&self) -> Option<String> {
        Some(if *self { "true" } else { "false" }.to_string())
    }
}

macro_rules! integer_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

integer_param!(i32, i64, u32, u64);

/// Timestamps go out as epoch seconds.
impl ParamValue for DateTime<Utc> {
    fn to_param(&self) -> Option<String> {
        Some(self.timestamp().to_string())
    }
}

/// Ordered mapping of query parameter names to rendered values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include `key` whenever `value` is present.
    pub fn add<V: ParamValue>(&mut self, key: &str, value: V) -> &mut Self {
        if let Some(rendered) = value.to_param() {
            self.insert(key, rendered);
        }
        self
    }

    /// Include `key` only when `value` is present and differs from `default`.
    pub fn add_with_default<V>(&mut self, key: &str, value: V, default: V) -> &mut Self
    where
        V: ParamValue + PartialEq,
    {
        if value != default {
            self.add(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Re-adding a key replaces its value but keeps its original position.
    fn insert(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
