use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub desktop: DesktopConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ipc: IpcConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// Geometry bounds and startup layout of the desktop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesktopConfig {
    #[serde(default = "default_min_x")]
    pub min_x: f64,
    /// Keeps windows below the menu bar.
    #[serde(default = "default_min_y")]
    pub min_y: f64,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    #[serde(default = "default_base_z_index")]
    pub base_z_index: u32,
    #[serde(default = "default_initial_panels")]
    pub initial_panels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

/// Contact mail relay settings. The API key itself is never stored here;
/// `api_key_env` names the environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: Vec<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_min_x() -> f64 {
    20.0
}
fn default_min_y() -> f64 {
    70.0
}
fn default_min_width() -> f64 {
    320.0
}
fn default_min_height() -> f64 {
    260.0
}
fn default_base_z_index() -> u32 {
    1000
}
fn default_initial_panels() -> Vec<String> {
    vec!["welcome".to_string()]
}
fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_socket_path() -> String {
    "/tmp/deskfolio.sock".to_string()
}
fn default_api_key_env() -> String {
    "RESEND_API_KEY".to_string()
}
fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}
fn default_from() -> String {
    "Portfolio Contact <noreply@contact.rjb.rip>".to_string()
}
fn default_to() -> Vec<String> {
    vec!["contact@rjb.rip".to_string()]
}
fn default_subject_prefix() -> String {
    "Portfolio Contact: ".to_string()
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            min_x: default_min_x(),
            min_y: default_min_y(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            base_z_index: default_base_z_index(),
            initial_panels: default_initial_panels(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_url: default_api_url(),
            from: default_from(),
            to: default_to(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

impl MailConfig {
    /// Reads the provider credential from the environment. Blank values
    /// count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
            .join(".config")
            .join("deskfolio")
            .join("config.toml")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.desktop.min_y, 70.0);
        assert_eq!(config.desktop.initial_panels, vec!["welcome".to_string()]);
        assert_eq!(config.mail.api_key_env, "RESEND_API_KEY");
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[desktop]\nmin_width = 400.0\n\n[server]\nbind_addr = \"0.0.0.0:8080\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.desktop.min_width, 400.0);
        assert_eq!(config.desktop.min_height, 260.0);
        assert_eq!(config.desktop.base_z_index, 1000);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.ipc.socket_path, "/tmp/deskfolio.sock");
        assert_eq!(config.mail.subject_prefix, "Portfolio Contact: ");
    }

    #[test]
    fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load(&path).unwrap();

        std::fs::write(&path, "[ipc]\nsocket_path = \"/tmp/other.sock\"\n").unwrap();
        config.reload(&path).unwrap();

        assert_eq!(config.ipc.socket_path, "/tmp/other.sock");
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mail = MailConfig {
            api_key_env: "DESKFOLIO_TEST_BLANK_KEY".to_string(),
            ..MailConfig::default()
        };
        std::env::set_var("DESKFOLIO_TEST_BLANK_KEY", "   ");
        assert_eq!(mail.api_key(), None);

        std::env::set_var("DESKFOLIO_TEST_BLANK_KEY", "re_123");
        assert_eq!(mail.api_key().as_deref(), Some("re_123"));
    }
}
