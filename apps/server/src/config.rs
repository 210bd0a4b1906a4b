use anyhow::Context;
use sim_core::SimulationSettings;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CORS_ORIGINS: [&str; 2] =
    ["http://localhost:5173", "https://mba-simulation.vercel.app"];

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub database_url: String,
    /// YAML settings used to seed an empty database.
    pub settings_path: Option<PathBuf>,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_url: persistence::default_sqlite_url().to_string(),
            settings_path: None,
            cors_allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset or unparsable values keep defaults.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let d = Self::default();
        Self {
            bind_host: non_empty(lookup("MBA_BIND_HOST")).unwrap_or(d.bind_host),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(d.port),
            database_url: non_empty(lookup("DATABASE_URL")).unwrap_or(d.database_url),
            settings_path: non_empty(lookup("MBA_SETTINGS_PATH")).map(PathBuf::from),
            cors_allowed_origins: non_empty(lookup("MBA_CORS_ORIGINS"))
                .map(|v| origin_list(&v))
                .unwrap_or(d.cors_allowed_origins),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Settings to seed an empty database with.
    pub fn seed_settings(&self) -> anyhow::Result<SimulationSettings> {
        match &self.settings_path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings file {}", path.display()))?;
                Ok(SimulationSettings::from_yaml_str(&text)?)
            }
            None => Ok(SimulationSettings::default()),
        }
    }
}
