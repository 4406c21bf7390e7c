//! A directory holding a request store, an authorizer directory and the
//! configuration that locates them.

use std::path::{Path, PathBuf};

use crate::{
    domain::Config,
    storage::{
        AuthorizerDirectory, RequestStore,
        authorizer_directory::Seed,
        json_file::SaveError,
    },
};

/// Name of the configuration file inside the workspace root.
pub const CONFIG_FILE: &str = "config.toml";

/// The request store and authorizer directory of one workspace root.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
    /// The conformity requests.
    pub requests: RequestStore,
    /// The application-code to authorizer lookup.
    pub authorizers: AuthorizerDirectory,
}

impl Workspace {
    /// Opens the workspace rooted at `root`.
    ///
    /// A missing or invalid `config.toml` falls back to the defaults. Missing
    /// data files are created. If the configuration asks for it, today's
    /// backup of the requests file is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if a missing data file cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let root = root.into();
        let config = load_config(&root);

        let requests = RequestStore::open(resolve(&root, config.requests_file()))?;
        if config.daily_backup {
            requests.backup_if_needed();
        }

        let seed = if config.seed_authorizers {
            Seed::Defaults
        } else {
            Seed::Empty
        };
        let authorizers =
            AuthorizerDirectory::open_with(resolve(&root, config.authorizers_file()), seed)?;

        Ok(Self {
            root,
            config,
            requests,
            authorizers,
        })
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn resolve(root: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn opens_with_default_files() {
        let tmp = TempDir::new().unwrap();

        let workspace = Workspace::open(tmp.path()).unwrap();

        assert_eq!(
            workspace.requests.path(),
            tmp.path().join("solicitudes_conformidad.json")
        );
        assert!(workspace.requests.path().exists());
        assert_eq!(workspace.authorizers.len(), 7);
        assert_eq!(workspace.root(), tmp.path());
    }

    #[test]
    fn honours_config_file() {
        let tmp = TempDir::new().unwrap();
        let mut config: Config = toml::from_str(
            "_version = \"1\"\nrequests_file = \"data/requests.json\"\nauthorizers_file = \"data/authorizers.json\"\n",
        )
        .unwrap();
        config.seed_authorizers = false;
        config.daily_backup = false;
        config.save(&tmp.path().join(CONFIG_FILE)).unwrap();

        let workspace = Workspace::open(tmp.path()).unwrap();

        assert!(tmp.path().join("data/requests.json").exists());
        assert!(workspace.authorizers.is_empty());
        assert!(!workspace.requests.info().daily_backup);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "this is = = not toml").unwrap();

        let workspace = Workspace::open(tmp.path()).unwrap();

        assert_eq!(workspace.config(), &Config::default());
    }

    #[test]
    fn daily_backup_taken_on_open() {
        let tmp = TempDir::new().unwrap();
        Workspace::open(tmp.path()).unwrap();

        let workspace = Workspace::open(tmp.path()).unwrap();

        assert!(workspace.requests.info().daily_backup);
    }
}
