//! Values stored in configuration layers

use crate::chain::Config;
use crate::error::{ConfigError, ConfigResult};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Local entries of a layer, keyed by name
pub type Mapping = BTreeMap<String, Value>;

/// Nested layers rendered before formatting gives up
///
/// A layer may hold a handle to itself; rendering stops here instead of
/// overflowing the stack.
const MAX_NESTING: usize = 64;

thread_local! {
    static NESTING: Cell<usize> = const { Cell::new(0) };
}

/// One level of nested layer rendering, released on drop
pub(crate) struct Nesting(());

impl Nesting {
    /// Enter a nested layer, or `None` once [`MAX_NESTING`] is reached
    pub(crate) fn enter() -> Option<Self> {
        NESTING.with(|depth| {
            let current = depth.get();
            (current < MAX_NESTING).then(|| {
                depth.set(current + 1);
                Nesting(())
            })
        })
    }
}

impl Drop for Nesting {
    fn drop(&mut self) {
        NESTING.with(|depth| depth.set(depth.get() - 1));
    }
}

/// A deferred producer, evaluated on every read
///
/// Clones share the producer, so two clones compare equal.
#[derive(Clone)]
pub struct Lazy(Arc<dyn Fn() -> Value + Send + Sync>);

impl Lazy {
    /// Wrap a zero-argument producer
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(producer))
    }

    /// Run the producer
    pub fn call(&self) -> Value {
        (self.0)()
    }

    /// Returns true if both handles share one producer
    pub fn ptr_eq(a: &Lazy, b: &Lazy) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&a.0) as *const (),
            Arc::as_ptr(&b.0) as *const (),
        )
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy(..)")
    }
}

/// A configuration value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or explicitly empty
    #[default]
    Nil,
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Plain mapping (not chained)
    Map(Mapping),
    /// Nested configuration layer (shared handle)
    Config(Config),
    /// Deferred producer
    Lazy(Lazy),
}

impl Value {
    /// Static name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Config(_) => "config",
            Value::Lazy(_) => "lazy",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Value::Config(config) => Some(config),
            _ => None,
        }
    }

    /// Evaluate a deferred producer; any other value is returned as is
    pub fn resolve(self) -> Value {
        match self {
            Value::Lazy(lazy) => {
                trace!("evaluating lazy value");
                lazy.call()
            }
            other => other,
        }
    }

    /// Copy made when a value is pinned from a default layer
    ///
    /// Scalars and lazy producers are returned as they are. Owned text and
    /// collections are cloned. A nested config becomes a fresh layer holding a
    /// shallow copy of its entries over the same default.
    pub fn duplicate(&self) -> Value {
        match self {
            Value::Config(config) => Value::Config(config.duplicate()),
            other => other.clone(),
        }
    }

    /// Convert to a plain mapping if the value is map-like
    pub fn as_mapping(&self) -> Option<Mapping> {
        match self {
            Value::Map(map) => Some(map.clone()),
            Value::Config(config) => Some(config.to_mapping()),
            _ => None,
        }
    }

    /// Like [`Value::as_mapping`], consuming the value and reporting failures
    pub fn into_mapping(self) -> ConfigResult<Mapping> {
        match self {
            Value::Map(map) => Ok(map),
            Value::Config(config) => Ok(config.to_mapping()),
            other => Err(ConfigError::NotAMapping {
                found: other.kind(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Config(a), Value::Config(b)) => a == b,
            (Value::Config(config), Value::Map(map)) | (Value::Map(map), Value::Config(config)) => {
                config.to_mapping() == *map
            }
            (Value::Lazy(a), Value::Lazy(b)) => Lazy::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn write_mapping(f: &mut fmt::Formatter<'_>, map: &Mapping) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    f.write_str("}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => write_mapping(f, map),
            Value::Config(config) => match Nesting::enter() {
                Some(_level) => write_mapping(f, &config.to_mapping()),
                None => f.write_str("{...}"),
            },
            Value::Lazy(lazy) => write!(f, "{}", lazy.call()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
            Value::Config(config) => config.serialize(serializer),
            Value::Lazy(lazy) => lazy.call().serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Map(map)
    }
}

impl From<Config> for Value {
    fn from(config: Config) -> Self {
        Value::Config(config)
    }
}

impl From<Lazy> for Value {
    fn from(lazy: Lazy) -> Self {
        Value::Lazy(lazy)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Integer(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => Value::Map(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
