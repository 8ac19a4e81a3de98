use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ImportError, ImportResult};

use super::ascii::AsciiFormatter;

/// Name of the pass-through formatter.
pub const NONE_FORMATTER: &str = "none";
/// Name of the transliterating formatter (the default).
pub const ASCII_FORMATTER: &str = "ascii";

/// Converts heading text into a field identifier.
///
/// Formatters must be pure: the same `(text, column)` always yields the same key. Closures of the
/// shape `Fn(&str, usize) -> String` implement this trait.
pub trait HeadingFormatter: Send + Sync {
    /// Format the heading `text` found at the 0-based `column`.
    fn format(&self, text: &str, column: usize) -> String;
}

impl<F> HeadingFormatter for F
where
    F: Fn(&str, usize) -> String + Send + Sync,
{
    fn format(&self, text: &str, column: usize) -> String {
        self(text, column)
    }
}

/// Named heading formatters plus an optional default name.
///
/// [`FormatterRegistry::new`] (and [`Default`]) come with `none` and `ascii` registered and `ascii`
/// as default. Names are case-insensitive.
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn HeadingFormatter>>,
    default: Option<String>,
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .field("default", &self.default)
            .finish()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterRegistry {
    /// Registry with the built-in formatters and `ascii` as default.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(NONE_FORMATTER, |text: &str, _column: usize| text.to_string());
        registry.register(ASCII_FORMATTER, AsciiFormatter);
        registry.default = Some(ASCII_FORMATTER.to_string());
        registry
    }

    /// Registry with no formatters and no default.
    pub fn empty() -> Self {
        Self {
            formatters: HashMap::new(),
            default: None,
        }
    }

    /// Register `formatter` under `name`, replacing any formatter already registered there.
    pub fn register(&mut self, name: &str, formatter: impl HeadingFormatter + 'static) -> &mut Self {
        self.formatters
            .insert(name.to_lowercase(), Arc::new(formatter));
        self
    }

    /// Set (or clear) the name used when [`Self::sanitize`] gets no explicit name.
    pub fn set_default(&mut self, name: Option<&str>) -> &mut Self {
        self.default = name.map(str::to_lowercase);
        self
    }

    /// The default formatter name, if any.
    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Whether a formatter is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(&name.to_lowercase())
    }

    /// Resolve a formatter by explicit name, falling back to the default.
    ///
    /// Fails with [`ImportError::FormatterNotFound`] when the resolved name is not registered and
    /// with [`ImportError::NoDefaultFormatter`] when no name can be resolved at all.
    pub fn resolve(&self, name: Option<&str>) -> ImportResult<Arc<dyn HeadingFormatter>> {
        let which = match name {
            Some(n) => n.to_lowercase(),
            None => self.default.clone().ok_or(ImportError::NoDefaultFormatter)?,
        };
        self.formatters
            .get(&which)
            .cloned()
            .ok_or(ImportError::FormatterNotFound { name: which })
    }

    /// Sanitize one heading text with the named (or default) formatter.
    pub fn sanitize(&self, text: &str, name: Option<&str>) -> ImportResult<String> {
        Ok(self.resolve(name)?.format(text, 0))
    }
}
