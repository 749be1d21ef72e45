//! Row identity and labelling.
//!
//! The core treats rows as opaque. It only ever looks at them through a
//! [`ValueMapper`] (identity, label, disabled flag) and through
//! [`LookupRow::field`] (stringified column values for search and sort).
//! Selection is keyed by [`Identity`], never by reference, so a row that is
//! re-fetched with updated fields is still the same selectable entity.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Stable key of a row, as returned by [`ValueMapper::get_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Int(i64),
    Str(String),
}

impl Identity {
    /// Reads an identity out of a JSON scalar.
    ///
    /// Integers and strings are accepted; everything else yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Identity {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Identity {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Host-supplied capability describing how to identify and label rows.
///
/// `get_id` must be a pure function of row content, unique across the whole
/// dataset and stable across re-fetches.
pub trait ValueMapper<T>: Send + Sync {
    /// Identity of the row.
    fn get_id(&self, row: &T) -> Identity;

    /// Human-readable label.
    fn get_text(&self, row: &T) -> String;

    /// Whether the row is shown but cannot be selected.
    fn is_disabled(&self, row: &T) -> bool {
        let _ = row;
        false
    }
}

type IdFn<T> = Arc<dyn Fn(&T) -> Identity + Send + Sync>;
type TextFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
type DisabledFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A [`ValueMapper`] built from closures.
///
/// # Example
///
/// ```ignore
/// let mapper = FnMapper::new(
///     |u: &User| Identity::from(u.id),
///     |u: &User| format!("{} {}", u.name, u.surname),
/// )
/// .with_disabled(|u: &User| !u.active);
/// ```
pub struct FnMapper<T> {
    id: IdFn<T>,
    text: TextFn<T>,
    disabled: Option<DisabledFn<T>>,
}

impl<T> FnMapper<T> {
    pub fn new<I, X>(id: I, text: X) -> Self
    where
        I: Fn(&T) -> Identity + Send + Sync + 'static,
        X: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            id: Arc::new(id),
            text: Arc::new(text),
            disabled: None,
        }
    }

    /// Marks rows matching `f` as disabled.
    pub fn with_disabled<D>(mut self, f: D) -> Self
    where
        D: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.disabled = Some(Arc::new(f));
        self
    }
}

impl<T> Clone for FnMapper<T> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            text: Arc::clone(&self.text),
            disabled: self.disabled.clone(),
        }
    }
}

impl<T> fmt::Debug for FnMapper<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMapper")
            .field("has_disabled", &self.disabled.is_some())
            .finish_non_exhaustive()
    }
}

impl<T> ValueMapper<T> for FnMapper<T> {
    fn get_id(&self, row: &T) -> Identity {
        (self.id)(row)
    }

    fn get_text(&self, row: &T) -> String {
        (self.text)(row)
    }

    fn is_disabled(&self, row: &T) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(row))
    }
}

/// Row contract for anything shown in the lookup grid.
///
/// `field` returns the stringified value of a column, or `None` if the row
/// has nothing under that key. Search and in-memory sorting only ever see
/// rows through this method.
///
/// # Example
///
/// ```ignore
/// impl LookupRow for User {
///     fn field(&self, key: &str) -> Option<String> {
///         match key {
///             "name" => Some(self.name.clone()),
///             "age" => Some(self.age.to_string()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait LookupRow: Clone + Send + Sync + 'static {
    fn field(&self, key: &str) -> Option<String>;
}

/// JSON objects are rows keyed by their property names.
impl LookupRow for serde_json::Value {
    fn field(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
