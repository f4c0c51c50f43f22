//! Loading payroll inputs from files and wiring them to the engine.
//!
//! - [`loader`]: bracket CSV into a [`folha_core::TaxTableConfig`]
//! - [`entries`]: monthly variable-entry CSV
//! - [`config`]: TOML configuration overrides
//! - [`logging`]: `tracing` subscriber setup for the `folha` binary

pub mod config;
pub mod entries;
pub mod loader;
pub mod logging;

pub use config::{ConfigError, load_config_file, parse_config, resolve_config, warn_if_invalid};
pub use entries::{EntryCsvError, EntryRow};
pub use loader::{TaxBracketRecord, TaxTableLoader, TaxTableLoaderError};
