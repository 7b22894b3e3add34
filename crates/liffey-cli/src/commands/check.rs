//! `liffey check` — validate the project configuration.
//!
//! Loads the config file (or falls back to pure defaults), resolves it, and
//! reports a short summary. Any load or validation failure surfaces as a
//! diagnostic and a nonzero exit.

use liffey_core::{load_partial, resolve, PartialConfig};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

/// Check summary for JSON output.
#[derive(Serialize)]
struct CheckResult {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    address: String,
    plugins: usize,
}

pub fn run(cwd: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    tracing::debug!(cwd = %cwd.display(), "checking configuration");

    let (partial, source) = match load_partial(cwd, config_path).into_diagnostic()? {
        Some((path, partial)) => {
            let rel = path.strip_prefix(cwd).unwrap_or(&path).to_path_buf();
            (partial, Some(rel))
        }
        None => (PartialConfig::default(), None),
    };

    let config = resolve(&partial).into_diagnostic()?;
    let address = format!("http://{}:{}", config.server.host, config.server.port);

    if json {
        let result = CheckResult {
            ok: true,
            config_file: source.as_ref().map(|p| p.display().to_string()),
            address,
            plugins: config.plugins.len(),
        };
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
        return Ok(());
    }

    match &source {
        Some(path) => println!("ok: {}", path.display()),
        None => println!("ok: no config file found, using defaults"),
    }
    println!("  server   {address}");
    if config.plugins.is_empty() {
        println!("  plugins  none");
    } else {
        let names: Vec<&str> = config.plugins.iter().map(|p| p.name.as_str()).collect();
        println!("  plugins  {}", names.join(", "));
    }
    println!(
        "  resolve  {} extensions, preserveSymlinks {}",
        config.resolve.extensions.len(),
        config.resolve.preserve_symlinks
    );
    Ok(())
}
