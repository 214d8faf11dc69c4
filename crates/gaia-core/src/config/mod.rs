//! # Configuration DTO
//!
//! Maps the TOML configuration file onto plain data. No validation and no
//! default calculation happens here: a missing value becomes an empty fact.
//! Defaults for production are built explicitly by
//! [`AppConfig::with_system_defaults`].

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the hosted backend (may be empty)
    pub backend_url: String,

    /// Public anon key sent with every backend request
    pub anon_key: String,

    pub profiles_table: String,

    /// Table whose rows mark admin users
    pub admins_table: String,

    pub storage_bucket: String,

    /// Object prefix for content-library uploads
    pub upload_prefix: String,

    /// Directory holding the local key/value store
    pub data_dir: PathBuf,

    pub log_dir: PathBuf,

    /// Admin emails used while the admin table is not provisioned
    pub admin_fallback_emails: Vec<String>,
}

fn str_at<'a>(value: &'a toml::Value, section: &str, key: &str) -> &'a str {
    value
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation
    /// or default value logic. Empty strings are valid "facts".
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        Ok(Self {
            backend_url: str_at(toml_value, "backend", "url").to_string(),
            anon_key: str_at(toml_value, "backend", "anon_key").to_string(),
            profiles_table: str_at(toml_value, "tables", "profiles").to_string(),
            admins_table: str_at(toml_value, "tables", "admins").to_string(),
            storage_bucket: str_at(toml_value, "storage", "bucket").to_string(),
            upload_prefix: str_at(toml_value, "storage", "upload_prefix").to_string(),
            data_dir: PathBuf::from(str_at(toml_value, "paths", "data_dir")),
            log_dir: PathBuf::from(str_at(toml_value, "paths", "log_dir")),
            admin_fallback_emails: toml_value
                .get("admin")
                .and_then(|a| a.get("fallback_emails"))
                .and_then(|v| v.as_array())
                .map(|emails| {
                    emails
                        .iter()
                        .filter_map(|e| e.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            profiles_table: String::new(),
            admins_table: String::new(),
            storage_bucket: String::new(),
            upload_prefix: String::new(),
            data_dir: PathBuf::new(),
            log_dir: PathBuf::new(),
            admin_fallback_emails: Vec::new(),
        }
    }

    /// Create AppConfig with system-default names and paths.
    ///
    /// `data_dir` is computed by the caller (e.g. with the `dirs` crate).
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            profiles_table: "profiles".to_string(),
            admins_table: "app_admins".to_string(),
            storage_bucket: "contents".to_string(),
            upload_prefix: "uploads".to_string(),
            log_dir: data_dir.join("logs"),
            data_dir: data_dir.join("store"),
            admin_fallback_emails: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_returns_empty_values_when_missing() {
        let toml_value: Value = toml::from_str("[backend]\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_from_toml_parses_all_sections() {
        let toml_str = r#"
            [backend]
            url = "https://example.supabase.co"
            anon_key = "anon"

            [tables]
            profiles = "profiles"
            admins = "app_admins"

            [storage]
            bucket = "contents"
            upload_prefix = "uploads"

            [paths]
            data_dir = "/var/lib/gaia"
            log_dir = "/var/log/gaia"

            [admin]
            fallback_emails = ["ops@gaia.example", 42]
        "#;
        let toml_value: Value = toml::from_str(toml_str).unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.backend_url, "https://example.supabase.co");
        assert_eq!(config.admins_table, "app_admins");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/gaia"));
        // Non-string entries are dropped, not rejected
        assert_eq!(config.admin_fallback_emails, vec!["ops@gaia.example"]);
    }

    #[test]
    fn test_with_system_defaults_creates_valid_paths() {
        let config = AppConfig::with_system_defaults(PathBuf::from("/tmp/gaia"));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/gaia/store"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/gaia/logs"));
        assert_eq!(config.storage_bucket, "contents");
        assert!(config.backend_url.is_empty());
    }
}
