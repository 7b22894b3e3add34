//! `liffey print` — emit the resolved canonical configuration as JSON.
//!
//! The output is the canonical record: feeding it back in as a config file
//! resolves to an identical record.

use liffey_core::{load_partial, resolve, PartialConfig};
use miette::{IntoDiagnostic, Result};
use std::path::Path;

pub fn run(cwd: &Path, config_path: Option<&Path>, pretty: bool) -> Result<()> {
    let partial = match load_partial(cwd, config_path).into_diagnostic()? {
        Some((path, partial)) => {
            tracing::debug!(config = %path.display(), "loaded config file");
            partial
        }
        None => PartialConfig::default(),
    };

    let config = resolve(&partial).into_diagnostic()?;

    let output = if pretty {
        serde_json::to_string_pretty(&config).into_diagnostic()?
    } else {
        serde_json::to_string(&config).into_diagnostic()?
    };
    println!("{output}");
    Ok(())
}
