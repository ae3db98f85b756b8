//! API key lookup.
//!
//! Secrets come from a `.env`-style file when one exists, falling back to
//! the process environment. The file wins so a per-install key can
//! override whatever the shell exports.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Variable holding the Golemio API key.
pub const API_KEY_VAR: &str = "GOLEMIO_API_KEY";

/// Key/value secrets from an env file and the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    vars: HashMap<String, String>,
    source: Option<PathBuf>,
    use_process_env: bool,
}

impl Secrets {
    /// Load the first existing file among `candidates`, with the process
    /// environment as fallback.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Self {
        for path in candidates.iter().map(AsRef::as_ref) {
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let vars = parse_env_file(&contents);
                    debug!(path = ?path, count = vars.len(), "loaded env file");
                    return Self {
                        vars,
                        source: Some(path.to_path_buf()),
                        use_process_env: true,
                    };
                }
                Err(e) => warn!(path = ?path, "failed to read env file: {e}"),
            }
        }

        debug!("no env file found, using process environment");
        Self {
            use_process_env: true,
            ..Self::default()
        }
    }

    /// Secrets with no file and no environment fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// The env file that was loaded, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .or_else(|| {
                self.use_process_env
                    .then(|| std::env::var(key).ok())
                    .flatten()
            })
            .filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.vars.keys().collect();
        keys.sort();
        f.debug_struct("Secrets")
            .field("keys", &keys)
            .field("source", &self.source)
            .field("use_process_env", &self.use_process_env)
            .finish()
    }
}

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, whitespace around keys and
/// values is trimmed, and one pair of matching surrounding quotes is
/// removed from values.
fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
