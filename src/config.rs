// Configuration module for classmap
// Reads from environment variables with sensible defaults

use std::env;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Track `for` statements in class bodies (CLASSMAP_TRACK_LOOPS)
    pub track_loops: bool,

    /// Honor .gitignore and .ignore files while scanning (CLASSMAP_RESPECT_IGNORE)
    pub respect_ignore: bool,

    /// Source file extensions, comma separated (CLASSMAP_EXTENSIONS)
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            track_loops: true,
            respect_ignore: false,
            extensions: vec!["py".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(val) = lookup("CLASSMAP_TRACK_LOOPS") {
            match parse_bool(&val) {
                Some(parsed) => config.track_loops = parsed,
                None => warn!(
                    value = %val,
                    default = config.track_loops,
                    "invalid CLASSMAP_TRACK_LOOPS, using default"
                ),
            }
        }

        if let Some(val) = lookup("CLASSMAP_RESPECT_IGNORE") {
            match parse_bool(&val) {
                Some(parsed) => config.respect_ignore = parsed,
                None => warn!(
                    value = %val,
                    default = config.respect_ignore,
                    "invalid CLASSMAP_RESPECT_IGNORE, using default"
                ),
            }
        }

        if let Some(val) = lookup("CLASSMAP_EXTENSIONS") {
            let extensions = parse_extensions(&val);
            if extensions.is_empty() {
                warn!(
                    value = ?val,
                    default = %config.extensions.join(","),
                    "invalid CLASSMAP_EXTENSIONS, using default"
                );
            } else {
                config.extensions = extensions;
            }
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma list like `py, .pyi` into bare extensions.
pub fn parse_extensions(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let ext = part.trim().trim_start_matches('.');
        if ext.is_empty() || out.iter().any(|value| value == ext) {
            continue;
        }
        out.push(ext.to_string());
    }
    out
}
