//! Chained configuration layers
//!
//! A [`Config`] holds local entries and an optional link to a default layer
//! that answers lookups the local entries cannot. Layers are shared handles:
//! cloning a `Config` yields another handle to the same layer, and writes
//! through any handle (including pinning and forget bubble-down) are visible
//! to every holder.
//!
//! The default link is fixed when a layer is created, so chains are always
//! finite and acyclic.
//!
//! # Example
//!
//! ```
//! use strata_config::{Config, Value};
//!
//! let root = Config::new();
//! root.set("pager", true)?;
//!
//! let session = Config::with_default(&root);
//! assert_eq!(session.get("pager"), Value::Bool(true));
//! assert!(!session.has("pager"));
//!
//! // Attribute-style reads pin a copy locally
//! session.attr("pager");
//! assert!(session.has("pager"));
//! # Ok::<(), strata_config::ConfigError>(())
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::reserved::is_reserved;
use crate::value::{Mapping, Nesting, Value};
use parking_lot::RwLock;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct Layer {
    entries: Mapping,
    default: Option<Config>,
}

/// A configuration layer with default fallback
///
/// Locks are held only for the duration of a single map operation and never
/// across a call into another layer or a lazy producer.
#[derive(Clone)]
pub struct Config {
    inner: Arc<RwLock<Layer>>,
}

impl Config {
    /// Create an empty layer with no default
    pub fn new() -> Self {
        Self::layered(None)
    }

    /// Create an empty layer that falls back to `default`
    pub fn with_default(default: &Config) -> Self {
        Self::layered(Some(default.clone()))
    }

    fn layered(default: Option<Config>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Layer {
                entries: Mapping::new(),
                default,
            })),
        }
    }

    /// Build a layer from a mapping, converting nested mappings into layers
    ///
    /// Nested layers have no default. Lists are converted element by element.
    ///
    /// # Errors
    ///
    /// `NotAMapping` if `attributes` is not map-like, `ReservedKey` if a key
    /// at any depth is an operation name.
    pub fn from_mapping(
        attributes: impl Into<Value>,
        default: Option<&Config>,
    ) -> ConfigResult<Self> {
        let mapping = attributes.into().into_mapping()?;
        let config = Self::layered(default.cloned());
        for (key, value) in mapping {
            config.set(&key, nest(value)?)?;
        }
        Ok(config)
    }

    /// Build a layer from a mapping without converting nested values
    pub fn assign(attributes: impl Into<Value>, default: Option<&Config>) -> ConfigResult<Self> {
        let config = Self::layered(default.cloned());
        config.merge(&attributes.into())?;
        Ok(config)
    }

    /// Returns true if both handles refer to the same layer
    pub fn ptr_eq(a: &Config, b: &Config) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Look up `key` locally, then along the default chain
    ///
    /// Lazy values are evaluated on every read. Missing keys yield
    /// [`Value::Nil`].
    pub fn get(&self, key: impl AsRef<str>) -> Value {
        let key = key.as_ref();
        let (local, default) = {
            let layer = self.inner.read();
            (layer.entries.get(key).cloned(), layer.default.clone())
        };
        match (local, default) {
            (Some(value), _) => value.resolve(),
            (None, Some(default)) => default.get(key),
            (None, None) => Value::Nil,
        }
    }

    /// Store `value` under `key` as given
    ///
    /// # Errors
    ///
    /// `ReservedKey` if `key` is an operation name.
    pub fn set(&self, key: impl AsRef<str>, value: impl Into<Value>) -> ConfigResult<()> {
        let key = key.as_ref();
        if is_reserved(key) {
            return Err(ConfigError::reserved(key));
        }
        self.insert(key, value.into());
        Ok(())
    }

    pub(crate) fn insert(&self, key: &str, value: Value) {
        debug_assert!(!is_reserved(key), "reserved key '{key}'");
        self.inner.write().entries.insert(key.to_owned(), value);
    }

    /// Remove `key` locally and from every default above the terminal one
    ///
    /// Intermediate defaults behave as caches of the chain and are cleared;
    /// the terminal default keeps its entry, so the next lookup sees it.
    pub fn forget(&self, key: impl AsRef<str>) {
        let key = key.as_ref();
        let default = {
            let mut layer = self.inner.write();
            layer.entries.remove(key);
            layer.default.clone()
        };
        if let Some(default) = default {
            if default.default_layer().is_some() {
                debug!(key, "forgetting key from intermediate default");
                default.forget(key);
            }
        }
    }

    /// Apply every pair of a map-like value with [`Config::set`]
    ///
    /// # Errors
    ///
    /// `NotAMapping` if `other` is neither a map nor a config;
    /// `ReservedKey` on the first reserved key (earlier pairs stay applied).
    pub fn merge(&self, other: &Value) -> ConfigResult<()> {
        let mapping = other.as_mapping().ok_or(ConfigError::NotAMapping {
            found: other.kind(),
        })?;
        for (key, value) in mapping {
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Merge any serializable object, e.g. a settings struct
    pub fn merge_from<T: Serialize + ?Sized>(&self, source: &T) -> ConfigResult<()> {
        let value = Value::from(serde_json::to_value(source)?);
        self.merge(&value)
    }

    /// Compare local entries with a map-like value, ignoring the default chain
    pub fn equals(&self, other: Option<&Value>) -> bool {
        match other.and_then(Value::as_mapping) {
            Some(mapping) => self.to_mapping() == mapping,
            None => false,
        }
    }

    /// Returns true if `key` is stored locally
    pub fn has(&self, key: impl AsRef<str>) -> bool {
        self.inner.read().entries.contains_key(key.as_ref())
    }

    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Local keys, in lexical order
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().entries.keys().cloned().collect()
    }

    /// Shallow copy of the local entries
    pub fn to_mapping(&self) -> Mapping {
        self.inner.read().entries.clone()
    }

    /// The direct default link
    pub fn default_layer(&self) -> Option<Config> {
        self.inner.read().default.clone()
    }

    /// The terminal layer of the default chain
    pub fn last_default(&self) -> Option<Config> {
        let mut current = self.default_layer()?;
        while let Some(next) = current.default_layer() {
            current = next;
        }
        Some(current)
    }

    /// Pin every key of the terminal default into this layer
    ///
    /// Lazy values are evaluated along the way. Returns the keys copied, or
    /// `None` when there is no default.
    pub fn eager_load(&self) -> Option<Vec<String>> {
        let root = self.last_default()?;
        let keys = root.keys();
        for key in &keys {
            self.attr(key);
        }
        debug!(count = keys.len(), "eager loaded keys from terminal default");
        Some(keys)
    }

    /// Returns true if `key` is stored here or anywhere down the chain
    pub fn responds_to(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        if self.has(key) {
            return true;
        }
        self.default_layer().is_some_and(|default| default.responds_to(key))
    }

    /// Attribute-style read
    ///
    /// A local hit behaves as [`Config::get`]. On a local miss the value is
    /// read from the default (through its own `attr`, so intermediate layers
    /// pin as well), duplicated, stored locally and returned.
    pub fn attr(&self, key: impl AsRef<str>) -> Value {
        let key = key.as_ref();
        if self.has(key) {
            return self.get(key);
        }
        let Some(default) = self.default_layer() else {
            return Value::Nil;
        };
        if !default.responds_to(key) {
            return Value::Nil;
        }

        let value = default.attr(key).duplicate();
        debug!(key, kind = value.kind(), "pinning value from default chain");
        self.insert(key, value.clone());
        value
    }

    /// Fresh layer holding a shallow copy of the entries over the same default
    pub fn duplicate(&self) -> Config {
        let layer = self.inner.read();
        Self {
            inner: Arc::new(RwLock::new(Layer {
                entries: layer.entries.clone(),
                default: layer.default.clone(),
            })),
        }
    }
}

fn nest(value: Value) -> ConfigResult<Value> {
    match value {
        Value::Map(map) => Ok(Value::Config(Config::from_mapping(Value::Map(map), None)?)),
        Value::List(items) => items
            .into_iter()
            .map(nest)
            .collect::<ConfigResult<Vec<_>>>()
            .map(Value::List),
        other => Ok(other),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares local entries; two distinct layers that each contain themselves
/// never finish comparing.
impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        Config::ptr_eq(self, other) || self.to_mapping() == other.to_mapping()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_level) = Nesting::enter() else {
            return f.write_str("Config { .. }");
        };
        let (entries, has_default) = {
            let layer = self.inner.read();
            (layer.entries.clone(), layer.default.is_some())
        };
        f.debug_struct("Config")
            .field("entries", &entries)
            .field("has_default", &has_default)
            .finish()
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(_level) = Nesting::enter() else {
            return Err(S::Error::custom(
                "configuration nests too deeply; a layer may contain itself",
            ));
        };
        self.to_mapping().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Lazy;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn chain() -> (Config, Config, Config) {
        let root = Config::new();
        let middle = Config::with_default(&root);
        let leaf = Config::with_default(&middle);
        (root, middle, leaf)
    }

    #[test]
    fn test_set_then_get() {
        let config = Config::new();
        config.set("prompt", "> ").unwrap();
        assert_eq!(config.get("prompt"), Value::from("> "));
    }

    #[test]
    fn test_set_reserved_key_fails() {
        let config = Config::new();
        let err = config.set("forget", 1).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedKey { ref key } if key == "forget"));
        assert!(!config.has("forget"));
    }

    #[test]
    fn test_get_missing_without_default_is_nil() {
        assert_eq!(Config::new().get("nothing"), Value::Nil);
    }

    #[test]
    fn test_local_entry_shadows_default() {
        let root = Config::new();
        root.set("pager", true).unwrap();
        let config = Config::with_default(&root);
        config.set("pager", false).unwrap();
        assert_eq!(config.get("pager"), Value::Bool(false));
    }

    #[test]
    fn test_get_falls_through_without_pinning() {
        let (root, middle, leaf) = chain();
        root.set("width", 80).unwrap();
        assert_eq!(leaf.get("width"), Value::Integer(80));
        assert!(!leaf.has("width"));
        assert!(!middle.has("width"));
    }

    #[test]
    fn test_lazy_is_not_cached() {
        let counter = Arc::new(AtomicI64::new(0));
        let source = Arc::clone(&counter);
        let root = Config::new();
        root.set(
            "tick",
            Lazy::new(move || Value::Integer(source.fetch_add(1, Ordering::SeqCst))),
        )
        .unwrap();
        let config = Config::with_default(&root);

        assert_eq!(config.get("tick"), Value::Integer(0));
        assert_eq!(config.get("tick"), Value::Integer(1));
        assert_eq!(root.get("tick"), Value::Integer(2));
    }

    #[test]
    fn test_attr_pins_resolved_lazy_value() {
        let root = Config::new();
        root.set("editor", Lazy::new(|| Value::from("vi"))).unwrap();
        let config = Config::with_default(&root);

        assert_eq!(config.attr("editor"), Value::from("vi"));
        assert_eq!(config.to_mapping()["editor"], Value::from("vi"));
    }

    #[test]
    fn test_attr_pins_through_intermediate_layers() {
        let (root, middle, leaf) = chain();
        root.set("prompt_name", "strata").unwrap();

        assert_eq!(leaf.attr("prompt_name"), Value::from("strata"));
        assert!(leaf.has("prompt_name"));
        assert!(middle.has("prompt_name"));
    }

    #[test]
    fn test_attr_unknown_key_is_nil() {
        let (_, _, leaf) = chain();
        assert_eq!(leaf.attr("missing"), Value::Nil);
        assert!(!leaf.has("missing"));
    }

    #[test]
    fn test_attr_duplicates_nested_config() {
        let root = Config::new();
        let history = Config::new();
        history.set("should_save", true).unwrap();
        root.set("history", history.clone()).unwrap();
        let config = Config::with_default(&root);

        let pinned = config.attr("history");
        let pinned = pinned.as_config().unwrap();
        assert!(!Config::ptr_eq(pinned, &history));

        pinned.set("should_save", false).unwrap();
        assert_eq!(history.get("should_save"), Value::Bool(true));
    }

    #[test]
    fn test_forget_bubbles_down_to_terminal_default() {
        let (root, middle, leaf) = chain();
        root.set("color", true).unwrap();
        middle.set("color", false).unwrap();
        leaf.set("color", false).unwrap();

        leaf.forget("color");

        assert!(!leaf.has("color"));
        assert!(!middle.has("color"));
        assert!(root.has("color"));
        assert_eq!(leaf.get("color"), Value::Bool(true));
    }

    #[test]
    fn test_forget_keeps_direct_terminal_default() {
        let root = Config::new();
        root.set("color", true).unwrap();
        let config = Config::with_default(&root);
        config.set("color", false).unwrap();

        config.forget("color");
        assert_eq!(config.get("color"), Value::Bool(true));
        assert!(root.has("color"));
    }

    #[test]
    fn test_forget_missing_key_is_noop() {
        let (_, _, leaf) = chain();
        leaf.forget("never-set");
        assert!(leaf.keys().is_empty());
    }

    #[test]
    fn test_merge_applies_pairs() {
        let config = Config::new();
        config.merge(&Value::from(json!({"a": 1, "b": "two"}))).unwrap();
        assert_eq!(config.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_from_config() {
        let source = Config::new();
        source.set("quiet", true).unwrap();
        let config = Config::new();
        config.merge(&Value::Config(source)).unwrap();
        assert_eq!(config.get("quiet"), Value::Bool(true));
    }

    #[test]
    fn test_merge_rejects_non_mapping() {
        let config = Config::new();
        let err = config.merge(&Value::from("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { found: "string" }));
    }

    #[test]
    fn test_merge_from_struct() {
        #[derive(Serialize)]
        struct Prompt {
            prompt_name: &'static str,
            memory_size: u32,
        }

        let config = Config::new();
        config
            .merge_from(&Prompt {
                prompt_name: "dbg",
                memory_size: 10,
            })
            .unwrap();
        assert_eq!(config.get("prompt_name"), Value::from("dbg"));
        assert_eq!(config.get("memory_size"), Value::Integer(10));
    }

    #[test]
    fn test_merge_from_non_object_fails() {
        let config = Config::new();
        let err = config.merge_from(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ConfigError::NotAMapping { found: "list" }));
    }

    #[test]
    fn test_equals_ignores_default_chain() {
        let a_root = Config::new();
        a_root.set("x", 1).unwrap();
        let a = Config::with_default(&a_root);
        let b = Config::new();
        a.set("y", 2).unwrap();
        b.set("y", 2).unwrap();

        assert_eq!(a, b);
        assert!(a.equals(Some(&Value::Config(b.clone()))));
        assert!(a.equals(Some(&Value::from(json!({"y": 2})))));
        assert!(!a.equals(None));
        assert!(!a.equals(Some(&Value::Integer(2))));
    }

    #[test]
    fn test_clear_only_touches_local_entries() {
        let root = Config::new();
        root.set("a", 1).unwrap();
        let config = Config::with_default(&root);
        config.set("b", 2).unwrap();

        config.clear();
        assert!(config.keys().is_empty());
        assert_eq!(config.get("a"), Value::Integer(1));
    }

    #[test]
    fn test_last_default() {
        let (root, middle, leaf) = chain();
        assert!(Config::ptr_eq(&leaf.last_default().unwrap(), &root));
        assert!(Config::ptr_eq(&middle.last_default().unwrap(), &root));
        assert!(root.last_default().is_none());
    }

    #[test]
    fn test_eager_load_copies_terminal_keys() {
        let (root, _, leaf) = chain();
        root.set("a", 1).unwrap();
        root.set("b", Lazy::new(|| Value::from("lazy"))).unwrap();

        let keys = leaf.eager_load().unwrap();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(leaf.to_mapping()["b"], Value::from("lazy"));
    }

    #[test]
    fn test_eager_load_without_default() {
        assert!(Config::new().eager_load().is_none());
    }

    #[test]
    fn test_from_mapping_nests_layers() {
        let config = Config::from_mapping(json!({"a": {"b": 1}, "list": [{"c": 2}, 3]}), None)
            .unwrap();

        let a = config.get("a");
        assert_eq!(a.as_config().unwrap().get("b"), Value::Integer(1));

        let list = config.get("list");
        let items = list.as_list().unwrap();
        assert_eq!(items[0].as_config().unwrap().get("c"), Value::Integer(2));
        assert_eq!(items[1], Value::Integer(3));
    }

    #[test]
    fn test_from_mapping_rejects_nested_reserved_key() {
        let err = Config::from_mapping(json!({"ok": {"keys": 1}}), None).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedKey { .. }));
    }

    #[test]
    fn test_assign_is_shallow() {
        let root = Config::new();
        let config = Config::assign(json!({"a": {"b": 1}}), Some(&root)).unwrap();
        assert!(matches!(config.get("a"), Value::Map(_)));
        assert!(Config::ptr_eq(&config.default_layer().unwrap(), &root));
    }

    #[test]
    fn test_shared_default_sees_pins() {
        let root = Config::new();
        root.set("a", 1).unwrap();
        let shared = Config::with_default(&root);
        let first = Config::with_default(&shared);
        let second = Config::with_default(&shared);

        first.attr("a");
        assert!(shared.has("a"));
        second.forget("a");
        assert!(!shared.has("a"));
    }

    #[test]
    fn test_serialize_local_entries() {
        let root = Config::new();
        root.set("hidden", 1).unwrap();
        let config = Config::with_default(&root);
        config.set("shown", true).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"shown": true}));
    }

    #[test]
    fn test_self_containing_layer_renders() {
        let config = Config::new();
        config.set("name", "loop").unwrap();
        config.set("me", config.clone()).unwrap();

        let shown = Value::Config(config.clone()).to_string();
        assert!(shown.starts_with("{me: {me: "));
        assert!(shown.contains("{...}"));
        assert!(format!("{config:?}").contains("Config { .. }"));
        assert!(serde_json::to_string(&config).is_err());

        // Rendering recovers once the cycle is broken
        config.forget("me");
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"name": "loop"}));
        assert_eq!(Value::Config(config).to_string(), "{name: loop}");
    }
}
