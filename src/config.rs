use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Lower bound for the status command timeout.
const MIN_TIMEOUT_MS: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub status: StatusSettings,
    #[serde(default)]
    pub launch: LaunchSettings,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    #[serde(default = "default_name")]
    pub name: String,
}

/// How the battery status command is invoked.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusSettings {
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct LaunchSettings {
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_name() -> String {
    "iBattery".into()
}

fn default_shell() -> String {
    "/bin/zsh".into()
}

fn default_command() -> String {
    "pmset -g batt".into()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_label() -> String {
    "com.ibattery.menubar".into()
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: default_name(),
        }
    }
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            command: default_command(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            label: default_label(),
        }
    }
}

impl StatusSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(MIN_TIMEOUT_MS))
    }
}

/// Parse a config document. Missing sections and fields take defaults.
pub fn parse(content: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load the config file.
/// Search order:
///   1. IBATTERY_CONFIG env var
///   2. ~/.ibattery/config.toml
///   3. Default values
pub fn load() -> AppConfig {
    let candidates = [
        std::env::var("IBATTERY_CONFIG").ok().map(PathBuf::from),
        dirs::home_dir().map(|h| h.join(".ibattery/config.toml")),
    ];

    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            match fs::read_to_string(&candidate) {
                Ok(content) => match parse(&content) {
                    Ok(config) => {
                        info!(
                            path = %candidate.display(),
                            command = %config.status.command,
                            "loaded config"
                        );
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %candidate.display(), error = %e, "failed to parse config");
                    }
                },
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "failed to read config");
                }
            }
        }
    }

    info!("no config file found, using defaults");
    AppConfig::default()
}
