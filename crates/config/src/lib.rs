//! # Config — options for opening a database
//!
//! A database is opened with an explicit [`OpenOptions`] value rather than
//! a long argument list, carrying whether to create the journal file if it
//! is missing and the configured [`DefaultValue`] policy used by `get` on a
//! miss (§4.7, "Default-value policy").

use std::fmt;
use std::sync::Arc;

/// The configured behavior for `get(k)` on a miss.
pub enum DefaultValue<T> {
    /// No default: a miss returns "absent".
    None,
    /// A default value is installed (and returned) for *every* missed key.
    Constant(T),
    /// A default value is derived from the missed key and installed (and
    /// returned).
    Factory(Arc<dyn Fn(&str) -> T + Send + Sync>),
}

impl<T> DefaultValue<T> {
    /// Resolves the configured default for `key`, if any.
    pub fn resolve(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        match self {
            DefaultValue::None => None,
            DefaultValue::Constant(v) => Some(v.clone()),
            DefaultValue::Factory(f) => Some(f(key)),
        }
    }
}

impl<T> Default for DefaultValue<T> {
    fn default() -> Self {
        DefaultValue::None
    }
}

impl<T> fmt::Debug for DefaultValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::None => f.write_str("DefaultValue::None"),
            DefaultValue::Constant(_) => f.write_str("DefaultValue::Constant(..)"),
            DefaultValue::Factory(_) => f.write_str("DefaultValue::Factory(..)"),
        }
    }
}

impl<T: Clone> Clone for DefaultValue<T> {
    fn clone(&self) -> Self {
        match self {
            DefaultValue::None => DefaultValue::None,
            DefaultValue::Constant(v) => DefaultValue::Constant(v.clone()),
            DefaultValue::Factory(f) => DefaultValue::Factory(Arc::clone(f)),
        }
    }
}

/// Options controlling how a database is opened.
pub struct OpenOptions<T> {
    /// Create the journal file (and write its header) if it does not
    /// already exist. If `false` and the file is missing, opening fails
    /// with `DbError::FileMissing`.
    pub create_if_missing: bool,
    /// The default-value policy used by `get` on a miss.
    pub default: DefaultValue<T>,
}

impl<T> OpenOptions<T> {
    /// Default options: create the file if missing, no default value.
    pub fn new() -> Self {
        OpenOptions {
            create_if_missing: true,
            default: DefaultValue::None,
        }
    }

    /// Sets whether the journal file is created if it does not exist.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Configures a constant default value installed on every miss.
    pub fn default_constant(mut self, value: T) -> Self {
        self.default = DefaultValue::Constant(value);
        self
    }

    /// Configures a default value factory, called with the missed key.
    pub fn default_factory<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        self.default = DefaultValue::Factory(Arc::new(f));
        self
    }
}

impl<T> Default for OpenOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OpenOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenOptions")
            .field("create_if_missing", &self.create_if_missing)
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests;
