use anyhow::{Result, anyhow};
use config::{Config, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub log: Log,
    pub store: Store,
    #[serde(default)]
    pub directory: Directory,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mysql,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: StoreBackend,
    /// Required for the mysql backend.
    pub dsn: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_timeout_ms() -> u64 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

/// Seed roster for the memory backend; ignored by mysql.
#[derive(Debug, Default, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
    pub id: String,
    pub display_name: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_settings_with_seed_roster() {
        let settings = parse_settings_str(
            r#"
[log]
filter = "kinship=debug"

[store]
backend = "memory"

[[directory.accounts]]
id = "u1"
display_name = "Ada Lovelace"
"#,
        )
        .unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.store.timeout_ms, 3000);
        assert!(settings.store.dsn.is_none());
        assert_eq!(settings.directory.accounts.len(), 1);
        assert_eq!(settings.directory.accounts[0].display_name, "Ada Lovelace");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let res = parse_settings_str(
            r#"
[log]
filter = "info"

[store]
backend = "postgres"
"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
