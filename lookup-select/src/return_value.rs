//! Turning a selection into the value shape the host asked for.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;
use crate::mapper::{Identity, ValueMapper};
use crate::selection::SelectMode;

/// Shape of the value delivered to `on_change` / `on_confirm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnShape {
    /// `{ id, text }` per row.
    #[default]
    IdText,
    /// The rows themselves.
    Row,
    /// Whatever the host's [`ReturnMap`] produces.
    Custom,
}

/// The `id-text` return shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdText {
    pub id: Identity,
    pub text: String,
}

impl IdText {
    pub fn new(id: impl Into<Identity>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Host-defined mapping for [`ReturnShape::Custom`].
pub struct ReturnMap<T>(Arc<dyn Fn(&T) -> serde_json::Value + Send + Sync>);

impl<T> ReturnMap<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> serde_json::Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn map(&self, row: &T) -> serde_json::Value {
        (self.0)(row)
    }
}

impl<T> Clone for ReturnMap<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for ReturnMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReturnMap(..)")
    }
}

/// One selected row, in the configured shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped<T> {
    IdText(IdText),
    Row(T),
    Custom(serde_json::Value),
}

impl<T: Serialize> Serialize for Mapped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::IdText(v) => v.serialize(serializer),
            Self::Row(v) => v.serialize(serializer),
            Self::Custom(v) => v.serialize(serializer),
        }
    }
}

/// Value delivered to the host on confirm.
///
/// `Single(None)` and an empty `Multiple` are the "nothing selected"
/// sentinels; they serialise as `null` and `[]`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue<T> {
    Single(Option<Mapped<T>>),
    Multiple(Vec<Mapped<T>>),
}

impl<T> ReturnValue<T> {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(v) => v.is_none(),
            Self::Multiple(v) => v.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(v) => usize::from(v.is_some()),
            Self::Multiple(v) => v.len(),
        }
    }

    /// All mapped items, in selection order.
    pub fn into_vec(self) -> Vec<Mapped<T>> {
        match self {
            Self::Single(v) => v.into_iter().collect(),
            Self::Multiple(v) => v,
        }
    }
}

impl<T: Serialize> Serialize for ReturnValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(None) => serializer.serialize_none(),
            Self::Single(Some(v)) => v.serialize(serializer),
            Self::Multiple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Everything [`map_return_value`] needs besides the rows.
pub struct ReturnConfig<'a, T> {
    pub shape: ReturnShape,
    pub return_map: Option<&'a ReturnMap<T>>,
    pub mapper: &'a dyn ValueMapper<T>,
    pub mode: SelectMode,
}

/// Maps selected rows to the configured shape.
///
/// Output order follows `rows`. In single mode only the first mapped row is
/// returned.
///
/// # Errors
///
/// [`ConfigError::MissingReturnMap`] when the shape is `Custom`, there is at
/// least one row, and no return map was supplied.
pub fn map_return_value<T: Clone>(
    rows: &[T],
    config: &ReturnConfig<'_, T>,
) -> Result<ReturnValue<T>, ConfigError> {
    if rows.is_empty() {
        return Ok(match config.mode {
            SelectMode::Single => ReturnValue::Single(None),
            SelectMode::Multiple => ReturnValue::Multiple(Vec::new()),
        });
    }

    let mapped: Vec<Mapped<T>> = match config.shape {
        ReturnShape::IdText => rows
            .iter()
            .map(|row| {
                Mapped::IdText(IdText {
                    id: config.mapper.get_id(row),
                    text: config.mapper.get_text(row),
                })
            })
            .collect(),
        ReturnShape::Row => rows.iter().cloned().map(Mapped::Row).collect(),
        ReturnShape::Custom => {
            let map = config.return_map.ok_or(ConfigError::MissingReturnMap)?;
            rows.iter().map(|row| Mapped::Custom(map.map(row))).collect()
        }
    };

    Ok(match config.mode {
        SelectMode::Single => ReturnValue::Single(mapped.into_iter().next()),
        SelectMode::Multiple => ReturnValue::Multiple(mapped),
    })
}
