//! Default build parameters and caller overrides.
//!
//! Defaults come from a job's declared parameter definitions. Overrides from
//! the caller can only replace the value of a declared parameter; names the
//! job does not declare never reach the server.

use std::collections::{BTreeMap, btree_map};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::JobMetadata;

/// Value of a single build parameter.
///
/// Only integers, booleans and strings can be sent to the trigger endpoint.
/// Anything else (floats, arrays, objects) is carried as
/// [`ParameterValue::Unsupported`] and left out of the encoded query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Boolean(bool),
    String(String),
    Unsupported(Value),
}

impl ParameterValue {
    /// Text sent on the wire, or `None` for unsupported values.
    pub fn encode(&self) -> Option<String> {
        match self {
            Self::Integer(i) => Some(i.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Unsupported(_) => None,
        }
    }

    /// Parses a command-line style value: integer, then `true`/`false`, then
    /// plain string.
    pub fn parse_literal(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            Self::Integer(i)
        } else if let Ok(b) = raw.parse::<bool>() {
            Self::Boolean(b)
        } else {
            Self::String(raw.to_string())
        }
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Self::Boolean(b),
            Value::String(s) => Self::String(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Unsupported(Value::Number(n)),
            },
            other => Self::Unsupported(other),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Parameters sent with a build, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParameterValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the declared defaults of a job.
    ///
    /// Definitions without a name or with a null default are skipped. If a
    /// name is declared twice the later definition wins.
    pub fn defaults_from(metadata: &JobMetadata) -> Self {
        let mut defaults = Self::new();
        for definition in metadata.parameter_definitions() {
            let Some(default) = &definition.default_parameter_value else {
                continue;
            };
            let (Some(name), Some(value)) = (&default.name, &default.value) else {
                debug!(name = ?default.name, "skipping parameter without a usable default");
                continue;
            };
            defaults.insert(name.clone(), value.clone());
        }
        defaults
    }

    /// Replaces declared values with caller overrides.
    ///
    /// Each override name is uppercased before lookup. Names that are not
    /// already present are ignored, so the set never grows.
    #[must_use]
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ParameterValue>,
    {
        for (name, value) in overrides {
            let name = name.as_ref();
            let key = name.to_uppercase();
            if let Some(slot) = self.0.get_mut(&key) {
                debug!(parameter = %key, "overriding default value");
                *slot = value.into();
            } else {
                warn!(parameter = %name, "ignoring override for undeclared parameter");
            }
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParameterValue> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a String, &'a ParameterValue);
    type IntoIter = btree_map::Iter<'a, String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
