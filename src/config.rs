// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::article::FlagPolicy;
use crate::error::{HubError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// How `/check_article` receives the record. The JSON endpoint is the
/// current one, older deployments only read form fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CheckEncoding {
    #[default]
    Json,
    Form,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    pub base_url: String,
    pub max_upload_mb: u64,
    pub flag_policy: FlagPolicy,
    pub check_encoding: CheckEncoding,
    pub form_clear_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub export_dir: PathBuf,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_upload_mb: 50,
            flag_policy: FlagPolicy::Boolean,
            check_encoding: CheckEncoding::Json,
            form_clear_delay_ms: 2000,
            request_timeout_secs: 30,
            export_dir: PathBuf::from("."),
        }
    }
}

impl HubConfig {
    /// Reads a TOML file; keys it leaves out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: HubConfig = toml::from_str(&text)
            .map_err(|e| HubError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn form_clear_delay(&self) -> Duration {
        Duration::from_millis(self.form_clear_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: HubConfig = toml::from_str(
            r#"
            base_url = "https://hub.example.org/"
            max_upload_mb = 10
            flag_policy = "free-text"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.flag_policy, FlagPolicy::FreeText);
        assert_eq!(config.check_encoding, CheckEncoding::Json);
        assert_eq!(config.form_clear_delay(), Duration::from_millis(2000));
        assert_eq!(config.endpoint("/stats"), "https://hub.example.org/stats");
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        fs::write(&path, "flag_policy = \"maybe\"\n").unwrap();

        match HubConfig::load(Some(&path)) {
            Err(HubError::Config(message)) => assert!(message.contains("hub.toml")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn huge_upload_limit_saturates() {
        let config = HubConfig { max_upload_mb: u64::MAX / 2, ..HubConfig::default() };
        assert_eq!(config.max_upload_bytes(), u64::MAX);
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(HubConfig::load(None).unwrap(), HubConfig::default());
    }
}
