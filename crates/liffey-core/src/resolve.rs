//! Configuration resolution: defaults, merge, validation.
//!
//! [`resolve`] is a pure transform from a loosely-populated
//! [`PartialConfig`] to the canonical [`BuildConfig`] record. It runs once at
//! process start; there are no retries and no partial success — either every
//! field validates and a complete record comes back, or the first invalid
//! field aborts resolution.

use std::net::IpAddr;

use globset::Glob;
use url::Host;

use crate::error::Error;
use crate::options::{
    BuildConfig, PartialConfig, PartialPlugin, PartialResolve, PartialServer, PluginSpec,
    ResolveOptions, ServerOptions, WatchOptions,
};

/// Default dev server port.
pub const DEFAULT_PORT: u16 = 5137;

/// Default host binding.
pub const DEFAULT_HOST: &str = "localhost";

/// Default extension probe order for extensionless imports.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".mjs", ".js", ".ts", ".jsx", ".tsx", ".json"];

/// Include pattern applied when a plugin descriptor declares none.
pub const DEFAULT_PLUGIN_INCLUDE: &str = "**/*";

/// Merge a partial configuration over the built-in defaults and validate it.
///
/// The merge is shallow at the top level; `server`, `resolve`, and `watch`
/// are merged key-by-key.
///
/// ```
/// use liffey_core::{resolve, PartialConfig};
///
/// let config = resolve(&PartialConfig::default()).unwrap();
/// assert_eq!(config.server.port, 5137);
/// assert!(config.resolve.preserve_symlinks);
/// ```
pub fn resolve(partial: &PartialConfig) -> Result<BuildConfig, Error> {
    Ok(BuildConfig {
        plugins: resolve_plugins(partial.plugins.as_deref().unwrap_or_default())?,
        clear_screen: partial.clear_screen.unwrap_or(true),
        server: resolve_server(partial.server.as_ref())?,
        resolve: resolve_modules(partial.resolve.as_ref())?,
    })
}

fn resolve_plugins(partial: &[PartialPlugin]) -> Result<Vec<PluginSpec>, Error> {
    let mut plugins = Vec::with_capacity(partial.len());
    for (i, p) in partial.iter().enumerate() {
        if p.name.is_empty() {
            return Err(Error::invalid(
                format!("plugins[{i}].name"),
                "plugin name must not be empty",
            ));
        }
        let include = p
            .include
            .clone()
            .unwrap_or_else(|| DEFAULT_PLUGIN_INCLUDE.to_string());
        validate_glob(format!("plugins[{i}].include"), &include)?;
        plugins.push(PluginSpec {
            name: p.name.clone(),
            include,
        });
    }
    Ok(plugins)
}

fn resolve_server(partial: Option<&PartialServer>) -> Result<ServerOptions, Error> {
    let p = partial.cloned().unwrap_or_default();

    let host = p.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    validate_host(&host)?;

    let port = match p.port {
        Some(n) => validate_port(n)?,
        None => DEFAULT_PORT,
    };

    let ignored = p.watch_ignored.unwrap_or_default();
    for pattern in &ignored {
        validate_glob("server.watch.ignored", pattern)?;
    }

    Ok(ServerOptions {
        open: p.open.unwrap_or(false),
        host,
        port,
        strict_port: p.strict_port.unwrap_or(false),
        cors: p.cors.unwrap_or(false),
        watch: WatchOptions { ignored },
    })
}

fn resolve_modules(partial: Option<&PartialResolve>) -> Result<ResolveOptions, Error> {
    let p = partial.cloned().unwrap_or_default();

    let extensions = p.extensions.unwrap_or_else(|| {
        DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
    });
    validate_extensions(&extensions)?;

    Ok(ResolveOptions {
        extensions,
        preserve_symlinks: p.preserve_symlinks.unwrap_or(true),
    })
}

fn validate_port(port: u64) -> Result<u16, Error> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| {
            Error::invalid(
                "server.port",
                format!("{port} is outside the valid TCP port range 1-65535"),
            )
        })
}

fn validate_host(host: &str) -> Result<(), Error> {
    if host.is_empty() {
        return Err(Error::invalid("server.host", "host must not be empty"));
    }
    // Bare IPv6 literals ("::1") are valid here but need brackets for the
    // URL parser, so probe the address types first.
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    match Host::parse(host) {
        Ok(_) => Ok(()),
        Err(e) => Err(Error::invalid(
            "server.host",
            format!("`{host}` is not a valid hostname or IP literal ({e})"),
        )),
    }
}

fn validate_extensions(extensions: &[String]) -> Result<(), Error> {
    if extensions.is_empty() {
        return Err(Error::invalid(
            "resolve.extensions",
            "at least one extension is required",
        ));
    }
    for ext in extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(Error::invalid(
                "resolve.extensions",
                format!("`{ext}` must start with `.` and name an extension"),
            ));
        }
    }
    Ok(())
}

fn validate_glob(field: impl Into<String>, pattern: &str) -> Result<(), Error> {
    match Glob::new(pattern) {
        Ok(_) => Ok(()),
        Err(e) => Err(Error::invalid(
            field,
            format!("`{pattern}` is not a valid glob: {e}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial_with_port(port: u64) -> PartialConfig {
        PartialConfig {
            server: Some(PartialServer {
                port: Some(port),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply() {
        let config = resolve(&PartialConfig::default()).unwrap();
        assert!(config.plugins.is_empty());
        assert!(config.clear_screen);
        assert!(!config.server.open);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(!config.server.strict_port);
        assert!(!config.server.cors);
        assert!(config.server.watch.ignored.is_empty());
        assert_eq!(config.resolve.extensions, DEFAULT_EXTENSIONS);
        assert!(config.resolve.preserve_symlinks);
    }

    #[test]
    fn test_explicit_values_preserved() {
        let partial = PartialConfig {
            server: Some(PartialServer {
                port: Some(5137),
                strict_port: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = resolve(&partial).unwrap();
        assert_eq!(config.server.port, 5137);
        assert!(config.server.strict_port);
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = resolve(&partial_with_port(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { field, .. } if field == "server.port"));
    }

    #[test]
    fn test_port_out_of_range_rejected() {
        let err = resolve(&partial_with_port(70000)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { field, .. } if field == "server.port"));
    }

    #[test]
    fn test_empty_host_rejected() {
        let partial = PartialConfig {
            server: Some(PartialServer {
                host: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = resolve(&partial).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { field, .. } if field == "server.host"));
    }

    #[test]
    fn test_malformed_host_rejected() {
        let partial = PartialConfig {
            server: Some(PartialServer {
                host: Some("not a host".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(resolve(&partial).is_err());
    }

    #[test]
    fn test_ip_literal_hosts_accepted() {
        for host in ["127.0.0.1", "0.0.0.0", "::1", "[::1]"] {
            let partial = PartialConfig {
                server: Some(PartialServer {
                    host: Some(host.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let config = resolve(&partial).unwrap();
            assert_eq!(config.server.host, host);
        }
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let partial = PartialConfig {
            resolve: Some(PartialResolve {
                extensions: Some(Vec::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = resolve(&partial).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { field, .. } if field == "resolve.extensions")
        );
    }

    #[test]
    fn test_extension_without_delimiter_rejected() {
        for bad in ["js", ".", ""] {
            let partial = PartialConfig {
                resolve: Some(PartialResolve {
                    extensions: Some(vec![bad.to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            };
            assert!(resolve(&partial).is_err(), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn test_plugin_include_defaults() {
        let partial = PartialConfig {
            plugins: Some(vec![PartialPlugin {
                name: "react".to_string(),
                include: None,
            }]),
            ..Default::default()
        };
        let config = resolve(&partial).unwrap();
        assert_eq!(config.plugins[0].include, DEFAULT_PLUGIN_INCLUDE);
    }

    #[test]
    fn test_plugin_brace_glob_accepted() {
        let partial = PartialConfig {
            plugins: Some(vec![PartialPlugin {
                name: "react".to_string(),
                include: Some("**/*.{jsx,tsx,js,ts}".to_string()),
            }]),
            ..Default::default()
        };
        let config = resolve(&partial).unwrap();
        assert_eq!(config.plugins[0].include, "**/*.{jsx,tsx,js,ts}");
    }

    #[test]
    fn test_invalid_plugin_glob_rejected() {
        let partial = PartialConfig {
            plugins: Some(vec![PartialPlugin {
                name: "react".to_string(),
                include: Some("**/*.{jsx,tsx".to_string()),
            }]),
            ..Default::default()
        };
        let err = resolve(&partial).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { field, .. } if field == "plugins[0].include")
        );
    }

    #[test]
    fn test_empty_plugin_name_rejected() {
        let partial = PartialConfig {
            plugins: Some(vec![PartialPlugin {
                name: String::new(),
                include: None,
            }]),
            ..Default::default()
        };
        assert!(resolve(&partial).is_err());
    }

    #[test]
    fn test_invalid_watch_glob_rejected() {
        let partial = PartialConfig {
            server: Some(PartialServer {
                watch_ignored: Some(["[".to_string()].into_iter().collect()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = resolve(&partial).unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { field, .. } if field == "server.watch.ignored")
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let partial = PartialConfig {
            plugins: Some(vec![PartialPlugin {
                name: "react".to_string(),
                include: Some("**/*.{jsx,tsx,js,ts}".to_string()),
            }]),
            clear_screen: Some(false),
            server: Some(PartialServer {
                host: Some("localhost".to_string()),
                port: Some(5137),
                strict_port: Some(true),
                cors: Some(true),
                watch_ignored: Some(["**/src-shell/**".to_string()].into_iter().collect()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let once = resolve(&partial).unwrap();
        let twice = resolve(&once.as_partial()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serialized_record_is_a_fixed_point() {
        let config = resolve(&PartialConfig::default()).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        let reparsed = PartialConfig::from_value(&value).unwrap();
        assert_eq!(resolve(&reparsed).unwrap(), config);
    }
}
