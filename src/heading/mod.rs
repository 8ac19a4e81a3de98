//! Heading identifier sanitization.
//!
//! Heading texts become field identifiers through a named [`HeadingFormatter`] looked up in a
//! [`FormatterRegistry`]. The registry is an explicit value: build one with the built-ins
//! (`none`, `ascii`), register extra formatters once, then share it read-only.
//!
//! ```rust
//! use rust_sheet_import::heading::FormatterRegistry;
//!
//! let mut registry = FormatterRegistry::new();
//! assert_eq!(registry.sanitize("Data de Emissão", None).unwrap(), "data_de_emissao");
//!
//! registry.register("upper", |text: &str, _column: usize| text.to_uppercase());
//! assert_eq!(registry.sanitize("total", Some("upper")).unwrap(), "TOTAL");
//! ```

pub mod ascii;
mod formatter;

pub use ascii::{sanitize_identifier, AsciiFormatter};
pub use formatter::{FormatterRegistry, HeadingFormatter, ASCII_FORMATTER, NONE_FORMATTER};
