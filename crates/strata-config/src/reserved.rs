//! Names that cannot be used as configuration keys
//!
//! Each entry is the name of an operation on [`Config`](crate::Config) or of
//! one of its constructors. Keeping them out of the key space means the
//! attribute-style adapter can never confuse a key with an operation.

/// Operation names rejected as keys, sorted for binary search
pub const RESERVED_KEYS: &[&str] = &[
    "assign",
    "attr",
    "clear",
    "default",
    "default_layer",
    "dispatch",
    "duplicate",
    "eager_load",
    "equals",
    "forget",
    "from_mapping",
    "get",
    "has",
    "keys",
    "last_default",
    "lookup",
    "merge",
    "merge_from",
    "new",
    "ptr_eq",
    "responds_to",
    "set",
    "to_mapping",
    "with_default",
];

/// Returns true if `key` collides with an operation name
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.binary_search(&key).is_ok()
}
