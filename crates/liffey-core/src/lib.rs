#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod loader;
pub mod options;
pub mod resolve;

pub use error::Error;
pub use loader::{find_config_file, load_partial};
pub use options::{BuildConfig, PartialConfig, PluginSpec, ResolveOptions, ServerOptions};
pub use resolve::resolve;
