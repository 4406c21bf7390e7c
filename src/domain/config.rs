use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a conformity-request workspace.
///
/// Paths are relative to the workspace root unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File holding the conformity requests.
    requests_file: String,

    /// File holding the authorizer directory.
    authorizers_file: String,

    /// Whether a dated copy of the requests file is taken once per day when
    /// the workspace is opened.
    pub daily_backup: bool,

    /// Whether a missing authorizer directory is created with the
    /// illustrative default entries rather than empty.
    pub seed_authorizers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            requests_file: default_requests_file(),
            authorizers_file: default_authorizers_file(),
            daily_backup: true,
            seed_authorizers: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The requests file name or path.
    #[must_use]
    pub fn requests_file(&self) -> &str {
        &self.requests_file
    }

    /// The authorizer directory file name or path.
    #[must_use]
    pub fn authorizers_file(&self) -> &str {
        &self.authorizers_file
    }
}

fn default_requests_file() -> String {
    "solicitudes_conformidad.json".to_string()
}

fn default_authorizers_file() -> String {
    "autorizadores_bd.json".to_string()
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_requests_file")]
        requests_file: String,

        #[serde(default = "default_authorizers_file")]
        authorizers_file: String,

        #[serde(default = "default_true")]
        daily_backup: bool,

        #[serde(default = "default_true")]
        seed_authorizers: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                requests_file,
                authorizers_file,
                daily_backup,
                seed_authorizers,
            } => Self {
                requests_file,
                authorizers_file,
                daily_backup,
                seed_authorizers,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            requests_file: config.requests_file,
            authorizers_file: config.authorizers_file,
            daily_backup: config.daily_backup,
            seed_authorizers: config.seed_authorizers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nrequests_file = \"req.json\"\nauthorizers_file = \"auth.json\"\ndaily_backup = false\nseed_authorizers = false\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.requests_file(), "req.json");
        assert_eq!(config.authorizers_file(), "auth.json");
        assert!(!config.daily_backup);
        assert!(!config.seed_authorizers);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndaily_backup = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.daily_backup = false;

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
