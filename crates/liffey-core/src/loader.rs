//! Config file discovery and parsing.
//!
//! Loads `liffey.config.ts`, `liffey.config.js`, `vite.config.ts`, or
//! `vite.config.js` and extracts the default-exported options object into a
//! [`PartialConfig`].
//!
//! The exported object must be a plain literal. Two pieces of surrounding
//! syntax are understood and lowered:
//!
//! - `export default defineConfig({ ... })` — the wrapper call is unwrapped.
//! - Plugin factory calls in the `plugins` array, e.g.
//!   `react({ include: "**/*.{jsx,tsx,js,ts}" })`, become descriptor objects
//!   `{ name: "react", include: "..." }`.
//!
//! TypeScript configs are accepted as long as the exported object itself
//! carries no type syntax; no transpiler is involved.

use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};

use crate::error::Error;
use crate::options::PartialConfig;

/// Config file names in priority order.
const CONFIG_FILES: &[&str] = &[
    "liffey.config.ts",
    "liffey.config.js",
    "vite.config.ts",
    "vite.config.js",
];

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
}

/// Load a partial configuration from a config file in the given root.
///
/// If `config_path` is `Some`, that file is used (relative paths are joined
/// onto `root`); otherwise discovery runs over [`CONFIG_FILES`]. A project
/// without a config file is not an error: the caller resolves pure defaults.
pub fn load_partial(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, PartialConfig)>, Error> {
    let path = match config_path {
        Some(p) => {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        }
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    let value = parse_config_source(&source).map_err(|message| Error::ConfigParse {
        path: path.clone(),
        message,
    })?;
    let partial = PartialConfig::from_value(&value)?;

    Ok(Some((path, partial)))
}

/// Parse a config source into the default-exported object value.
fn parse_config_source(source: &str) -> Result<Value, String> {
    let stripped = strip_comments(source);
    let object = default_export_object(&stripped)?;
    Cursor { rest: object }.value()
}

/// Locate the `export default` object, unwrapping an optional factory call
/// such as `defineConfig({ ... })`.
fn default_export_object(source: &str) -> Result<&str, String> {
    let marker = "export default";
    let idx = source
        .find(marker)
        .ok_or_else(|| "no `export default { ... }` found in config file".to_string())?;
    let mut rest = source[idx + marker.len()..].trim_start();

    if rest.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$') {
        let ident_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        let after_ident = rest[ident_len..].trim_start();
        match after_ident.strip_prefix('(') {
            Some(inner) => rest = inner.trim_start(),
            None => {
                return Err(
                    "expected a call such as `defineConfig({ ... })` after `export default`"
                        .to_string(),
                )
            }
        }
    }

    if !rest.starts_with('{') {
        return Err("`export default` must be followed by an object literal".to_string());
    }
    balanced_object(rest)
}

/// Slice the balanced `{ ... }` off the start of `input`, string-aware.
fn balanced_object(input: &str) -> Result<&str, String> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in input.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => in_string = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&input[..=i]);
                }
            }
            _ => {}
        }
    }
    Err("unbalanced braces in config object".to_string())
}

/// Strip line (`//`) and block (`/* */`) comments, preserving newlines and
/// string contents.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(quote) = in_string {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => {
                in_string = Some(ch);
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Recursive-descent parser for the object literal dialect config files use:
/// unquoted (and dotted) keys, single quotes, trailing commas, and plugin
/// factory calls.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let mut chars = self.rest.chars();
        let ch = chars.next()?;
        self.rest = chars.as_str();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let end = self.rest.find(|c: char| !pred(c)).unwrap_or(self.rest.len());
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        taken
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('"' | '\'') => self.string().map(Value::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.word_or_call(),
            Some(c) => Err(format!("unexpected character `{c}` in config object")),
            None => Err("unexpected end of config object".to_string()),
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.bump(); // '{'
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if self.rest.is_empty() {
                return Err("unterminated object literal".to_string());
            }

            let key = self.key()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(format!("expected `:` after key `{key}`"));
            }
            map.insert(key, self.value()?);

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            return Err("expected `,` or `}` in object literal".to_string());
        }
    }

    fn array(&mut self) -> Result<Value, String> {
        self.bump(); // '['
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            if self.rest.is_empty() {
                return Err("unterminated array literal".to_string());
            }

            items.push(self.value()?);

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            return Err("expected `,` or `]` in array literal".to_string());
        }
    }

    fn key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some('"' | '\'') => self.string(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => Ok(self
                .take_while(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
                .to_string()),
            Some(c) => Err(format!("expected object key, got `{c}`")),
            None => Err("expected object key, got end of input".to_string()),
        }
    }

    fn string(&mut self) -> Result<String, String> {
        let Some(quote) = self.bump() else {
            return Err("expected string literal".to_string());
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) => out.push(c),
                    None => return Err("unterminated string escape".to_string()),
                },
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let literal = self.take_while(|c| {
            c.is_ascii_digit() || c == '-' || c == '+' || c == '.' || c == 'e' || c == 'E'
        });
        if literal.contains(['.', 'e', 'E']) {
            let n: f64 = literal
                .parse()
                .map_err(|_| format!("invalid number `{literal}`"))?;
            Number::from_f64(n)
                .map(Value::Number)
                .ok_or_else(|| format!("invalid number `{literal}`"))
        } else {
            let n: i64 = literal
                .parse()
                .map_err(|_| format!("invalid number `{literal}`"))?;
            Ok(Value::Number(n.into()))
        }
    }

    /// Keywords, or a plugin factory call lowered to a descriptor object.
    fn word_or_call(&mut self) -> Result<Value, String> {
        let ident = self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
        match ident {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" | "undefined" => return Ok(Value::Null),
            _ => {}
        }

        self.skip_ws();
        if !self.eat('(') {
            return Err(format!("unexpected identifier `{ident}`"));
        }

        let mut descriptor = Map::new();
        descriptor.insert("name".to_string(), Value::String(ident.to_string()));

        self.skip_ws();
        if self.peek() != Some(')') {
            let Value::Object(fields) = self.value()? else {
                return Err(format!(
                    "arguments to `{ident}(...)` must be an object literal"
                ));
            };
            for (key, val) in fields {
                descriptor.insert(key, val);
            }
            self.skip_ws();
        }
        if !self.eat(')') {
            return Err(format!("unterminated call to `{ident}(...)`"));
        }
        Ok(Value::Object(descriptor))
    }
}
