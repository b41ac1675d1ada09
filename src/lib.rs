//! # Config Expect
//!
//! **Declare what your configuration must contain, then load it.**
//!
//! Register an expectation for every (section, key) the program reads, with
//! its type and default. Loading a file coerces each matching entry to the
//! declared type and falls back to the default for anything missing or
//! unconvertible, so after a load every slot holds a usable, correctly typed
//! value.
//!
//! ```no_run
//! use config_expect::{DataType, ExpectationRegistry};
//!
//! let mut registry = ExpectationRegistry::new();
//! registry.register("Net", "port", DataType::Integer, 8080, Some("listen port"))?;
//! registry.register("Net", "tls", DataType::Boolean, false, None)?;
//!
//! if let Err(err) = registry.load_from("app.ini") {
//!     eprintln!("running on defaults: {err}");
//! }
//! let port = registry.get_integer("Net", "port");
//! # Ok::<(), config_expect::ExpectationError>(())
//! ```
//!
//! # Properties
//!
//! - **Typed slots**: values are a closed sum type; a slot never holds a
//!   value of another kind.
//! - **Defaults always apply**: a missing or corrupt file still leaves every
//!   slot populated, while the load result tells the caller what happened.
//! - **Pluggable formats**: INI by default, TOML available, anything else
//!   through [`SourceFormat`].
//! - **Atomic write-back**: the effective configuration is written through a
//!   temporary file.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]

mod defaults;
mod document;
mod errors;
mod expectation;
mod format;
mod registry;
mod value;

pub use defaults::DEFAULT_SECTION;
pub use document::{Document, Section};
pub use errors::{ErrorCategory, ExpectationError, Result};
pub use expectation::Expectation;
pub use format::{FormatError, IniFormat, IniOptions, SourceFormat, TomlFormat};
pub use registry::{ExpectationRegistry, FieldId, LoadReport};
pub use value::{parse_bool, DataType, Value, FALSE_TOKENS, TRUE_TOKENS};
