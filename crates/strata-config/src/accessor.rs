//! Attribute-style access by name
//!
//! Front ends that expose a config as an object with arbitrary attributes
//! (`config.color`, `config.color = false`) go through [`Config::dispatch`].
//! Everything else uses the typed operations on [`Config`] directly.

use crate::chain::Config;
use crate::error::{ConfigError, ConfigResult};
use crate::reserved::is_reserved;
use crate::value::Value;

impl Config {
    /// Dispatch an attribute access by name
    ///
    /// A name ending in `=` assigns its single argument and returns it. Any
    /// other name reads the attribute through [`Config::attr`].
    ///
    /// # Errors
    ///
    /// `Arity` on a wrong argument count, `ReservedKey` when the name is an
    /// operation name.
    pub fn dispatch(&self, name: &str, args: Vec<Value>) -> ConfigResult<Value> {
        if let Some(key) = name.strip_suffix('=') {
            let [value]: [Value; 1] = args.try_into().map_err(|args: Vec<Value>| {
                ConfigError::Arity {
                    name: name.to_owned(),
                    expected: 1,
                    got: args.len(),
                }
            })?;
            self.set(key, value.clone())?;
            return Ok(value);
        }

        if !args.is_empty() {
            return Err(ConfigError::Arity {
                name: name.to_owned(),
                expected: 0,
                got: args.len(),
            });
        }
        if is_reserved(name) {
            return Err(ConfigError::reserved(name));
        }
        Ok(self.attr(name))
    }

    /// Read a dotted path (`history.file`) through nested layers
    ///
    /// Each segment is read with [`Config::attr`]. A segment that does not
    /// land on a nested config ends the walk with [`Value::Nil`].
    pub fn lookup(&self, dotted: &str) -> Value {
        let mut segments = dotted.split('.');
        let mut current = match segments.next() {
            Some(first) => self.attr(first),
            None => return Value::Nil,
        };
        for segment in segments {
            current = match current {
                Value::Config(nested) => nested.attr(segment),
                _ => return Value::Nil,
            };
        }
        current
    }
}
