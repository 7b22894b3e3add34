//! Configuration schema for the liffey dev server.
//!
//! Two families of types live here: the `Partial*` types mirror what a config
//! file may supply (every field optional), and [`BuildConfig`] is the
//! canonical record produced by [`resolve`](crate::resolve::resolve) —
//! immutable, fully populated, and safe for direct consumption by the server
//! and bundler.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Canonical, fully resolved configuration record.
///
/// Serializes with the same camelCase keys the config file uses, so a
/// serialized record is itself a valid (and fixed-point) config input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Plugin descriptors, in registration order.
    pub plugins: Vec<PluginSpec>,
    /// Whether the dev server may clear the console on restart.
    pub clear_screen: bool,
    /// Dev server options.
    pub server: ServerOptions,
    /// Module resolution options.
    pub resolve: ResolveOptions,
}

/// A plugin descriptor: a name plus the glob selecting the files it
/// transforms. Descriptors are data only — plugin execution happens in the
/// bundler, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    /// Plugin name (e.g. `react`).
    pub name: String,
    /// Inclusion glob (e.g. `**/*.{jsx,tsx,js,ts}`).
    pub include: String,
}

/// Dev server options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOptions {
    /// Open a browser once the server is listening.
    pub open: bool,
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Fail instead of probing for a free port when `port` is taken.
    pub strict_port: bool,
    /// Send permissive CORS headers (needed by embedded shells).
    pub cors: bool,
    /// File watcher options.
    pub watch: WatchOptions,
}

/// File watcher options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    /// Glob patterns excluded from watching. Never checked against the
    /// filesystem — only their syntax is validated.
    pub ignored: BTreeSet<String>,
}

/// Module resolution options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    /// Extensions probed for extensionless imports, in precedence order.
    pub extensions: Vec<String>,
    /// Keep symlinked files at their symlink path instead of canonicalizing.
    pub preserve_symlinks: bool,
}

impl BuildConfig {
    /// Demote the canonical record back to a partial input.
    ///
    /// Resolving the result yields a record identical to `self`.
    #[must_use]
    pub fn as_partial(&self) -> PartialConfig {
        PartialConfig {
            plugins: Some(
                self.plugins
                    .iter()
                    .map(|p| PartialPlugin {
                        name: p.name.clone(),
                        include: Some(p.include.clone()),
                    })
                    .collect(),
            ),
            clear_screen: Some(self.clear_screen),
            server: Some(PartialServer {
                open: Some(self.server.open),
                host: Some(self.server.host.clone()),
                port: Some(u64::from(self.server.port)),
                strict_port: Some(self.server.strict_port),
                cors: Some(self.server.cors),
                watch_ignored: Some(self.server.watch.ignored.clone()),
            }),
            resolve: Some(PartialResolve {
                extensions: Some(self.resolve.extensions.clone()),
                preserve_symlinks: Some(self.resolve.preserve_symlinks),
            }),
        }
    }
}

/// Partial configuration as supplied by a config file or the host process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub plugins: Option<Vec<PartialPlugin>>,
    pub clear_screen: Option<bool>,
    pub server: Option<PartialServer>,
    pub resolve: Option<PartialResolve>,
}

/// Partial plugin descriptor. `name` is mandatory even in partial form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialPlugin {
    pub name: String,
    pub include: Option<String>,
}

/// Partial dev server options.
///
/// `port` is kept wider than `u16` so an out-of-range value survives to
/// validation instead of being mangled on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialServer {
    pub open: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u64>,
    pub strict_port: Option<bool>,
    pub cors: Option<bool>,
    pub watch_ignored: Option<BTreeSet<String>>,
}

/// Partial module resolution options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResolve {
    pub extensions: Option<Vec<String>>,
    pub preserve_symlinks: Option<bool>,
}

impl PartialConfig {
    /// Convert a loosely-typed JSON value into a typed partial config.
    ///
    /// Keys with no schema entry are rejected with
    /// [`Error::UnknownOption`] — at the top level and below it, the same
    /// typo-catching policy — and type mismatches with
    /// [`Error::InvalidConfiguration`].
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let Some(obj) = value.as_object() else {
            return Err(Error::invalid("config", "expected an object literal"));
        };

        let mut partial = Self::default();
        for (key, val) in obj {
            match key.as_str() {
                "plugins" => partial.plugins = Some(plugins_from_value(val)?),
                "clearScreen" => partial.clear_screen = Some(expect_bool("clearScreen", val)?),
                "server" => partial.server = Some(PartialServer::from_value(val)?),
                "resolve" => partial.resolve = Some(PartialResolve::from_value(val)?),
                other => return Err(Error::unknown(other)),
            }
        }
        Ok(partial)
    }
}

impl PartialServer {
    fn from_value(value: &Value) -> Result<Self, Error> {
        let Some(obj) = value.as_object() else {
            return Err(Error::invalid("server", "expected an object literal"));
        };

        let mut server = Self::default();
        for (key, val) in obj {
            match key.as_str() {
                "open" => server.open = Some(expect_bool("server.open", val)?),
                "host" => server.host = Some(expect_string("server.host", val)?),
                "port" => server.port = Some(expect_integer("server.port", val)?),
                "strictPort" => server.strict_port = Some(expect_bool("server.strictPort", val)?),
                "cors" => server.cors = Some(expect_bool("server.cors", val)?),
                "watch" => server.watch_ignored = Some(watch_ignored_from_value(val)?),
                other => return Err(Error::unknown(format!("server.{other}"))),
            }
        }
        Ok(server)
    }
}

impl PartialResolve {
    fn from_value(value: &Value) -> Result<Self, Error> {
        let Some(obj) = value.as_object() else {
            return Err(Error::invalid("resolve", "expected an object literal"));
        };

        let mut resolve = Self::default();
        for (key, val) in obj {
            match key.as_str() {
                "extensions" => {
                    resolve.extensions = Some(expect_string_array("resolve.extensions", val)?);
                }
                "preserveSymlinks" => {
                    resolve.preserve_symlinks =
                        Some(expect_bool("resolve.preserveSymlinks", val)?);
                }
                other => return Err(Error::unknown(format!("resolve.{other}"))),
            }
        }
        Ok(resolve)
    }
}

fn plugins_from_value(value: &Value) -> Result<Vec<PartialPlugin>, Error> {
    let Some(entries) = value.as_array() else {
        return Err(Error::invalid("plugins", "expected an array"));
    };

    let mut plugins = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let Some(obj) = entry.as_object() else {
            return Err(Error::invalid(
                format!("plugins[{i}]"),
                "expected a plugin descriptor object",
            ));
        };

        let mut name = None;
        let mut include = None;
        for (key, val) in obj {
            match key.as_str() {
                "name" => name = Some(expect_string(format!("plugins[{i}].name"), val)?),
                "include" => {
                    include = Some(expect_string(format!("plugins[{i}].include"), val)?);
                }
                other => return Err(Error::unknown(format!("plugins[{i}].{other}"))),
            }
        }

        let Some(name) = name else {
            return Err(Error::invalid(
                format!("plugins[{i}]"),
                "plugin descriptor is missing `name`",
            ));
        };
        plugins.push(PartialPlugin { name, include });
    }
    Ok(plugins)
}

fn watch_ignored_from_value(value: &Value) -> Result<BTreeSet<String>, Error> {
    let Some(obj) = value.as_object() else {
        return Err(Error::invalid("server.watch", "expected an object literal"));
    };

    let mut ignored = BTreeSet::new();
    for (key, val) in obj {
        match key.as_str() {
            "ignored" => {
                ignored = expect_string_array("server.watch.ignored", val)?
                    .into_iter()
                    .collect();
            }
            other => return Err(Error::unknown(format!("server.watch.{other}"))),
        }
    }
    Ok(ignored)
}

fn expect_bool(field: impl Into<String>, value: &Value) -> Result<bool, Error> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid(field, "expected a boolean"))
}

fn expect_string(field: impl Into<String>, value: &Value) -> Result<String, Error> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::invalid(field, "expected a string"))
}

fn expect_integer(field: impl Into<String>, value: &Value) -> Result<u64, Error> {
    value
        .as_u64()
        .ok_or_else(|| Error::invalid(field, "expected a non-negative integer"))
}

fn expect_string_array(field: impl Into<String>, value: &Value) -> Result<Vec<String>, Error> {
    let field = field.into();
    let Some(entries) = value.as_array() else {
        return Err(Error::invalid(field, "expected an array of strings"));
    };
    entries
        .iter()
        .map(|v| expect_string(field.clone(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full_object() {
        let value = json!({
            "plugins": [{ "name": "react", "include": "**/*.{jsx,tsx}" }],
            "clearScreen": false,
            "server": {
                "open": false,
                "host": "localhost",
                "port": 5137,
                "strictPort": true,
                "cors": true,
                "watch": { "ignored": ["**/src-shell/**"] },
            },
            "resolve": {
                "extensions": [".ts", ".tsx"],
                "preserveSymlinks": true,
            },
        });

        let partial = PartialConfig::from_value(&value).unwrap();
        let plugins = partial.plugins.unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name, "react");
        assert_eq!(plugins[0].include.as_deref(), Some("**/*.{jsx,tsx}"));
        assert_eq!(partial.clear_screen, Some(false));

        let server = partial.server.unwrap();
        assert_eq!(server.port, Some(5137));
        assert_eq!(server.strict_port, Some(true));
        assert!(server.watch_ignored.unwrap().contains("**/src-shell/**"));

        let resolve = partial.resolve.unwrap();
        assert_eq!(resolve.extensions.unwrap(), vec![".ts", ".tsx"]);
        assert_eq!(resolve.preserve_symlinks, Some(true));
    }

    #[test]
    fn test_unknown_top_level_key() {
        let err = PartialConfig::from_value(&json!({ "fooBar": true })).unwrap_err();
        assert!(matches!(err, Error::UnknownOption { key } if key == "fooBar"));
    }

    #[test]
    fn test_unknown_nested_key() {
        let err = PartialConfig::from_value(&json!({ "server": { "prot": 3000 } })).unwrap_err();
        assert!(matches!(err, Error::UnknownOption { key } if key == "server.prot"));
    }

    #[test]
    fn test_port_type_mismatch() {
        let err = PartialConfig::from_value(&json!({ "server": { "port": "5137" } })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { field, .. } if field == "server.port"));
    }

    #[test]
    fn test_negative_port_rejected() {
        let err = PartialConfig::from_value(&json!({ "server": { "port": -1 } })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_plugin_without_name() {
        let err =
            PartialConfig::from_value(&json!({ "plugins": [{ "include": "**/*" }] })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_unknown_plugin_key() {
        let value = json!({ "plugins": [{ "name": "react", "enforce": "pre" }] });
        let err = PartialConfig::from_value(&value).unwrap_err();
        assert!(matches!(err, Error::UnknownOption { key } if key == "plugins[0].enforce"));
    }

    #[test]
    fn test_empty_object_is_empty_partial() {
        let partial = PartialConfig::from_value(&json!({})).unwrap();
        assert_eq!(partial, PartialConfig::default());
    }
}
