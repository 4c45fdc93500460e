//! Config discovery for apptail.
//!
//! Walks parent directories to find `apptail.yaml` and checks for global config
//! at `~/.config/apptail/config.yaml`.

use std::path::{Path, PathBuf};

/// Project config filename to search for in parent directories.
pub const PROJECT_CONFIG_NAME: &str = "apptail.yaml";

/// Global config filename within the apptail config directory.
pub const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Result of config discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    /// Full path to the closest `apptail.yaml`.
    pub project_config: Option<PathBuf>,
    /// Full path to the global config file (`~/.config/apptail/config.yaml`).
    pub global_config: Option<PathBuf>,
}

impl DiscoveryResult {
    /// The file that wins: project over global.
    pub fn effective(&self) -> Option<&Path> {
        self.project_config
            .as_deref()
            .or(self.global_config.as_deref())
    }
}

/// Discover config files starting from the current working directory.
pub fn discover() -> DiscoveryResult {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.canonicalize().unwrap_or(dir),
        Err(_) => {
            return DiscoveryResult {
                project_config: None,
                global_config: global_config_path(),
            }
        }
    };
    discover_from(&cwd, dirs::config_dir().as_deref())
}

/// Discover config files from `start`, with `config_dir` as the platform
/// config directory.
pub fn discover_from(start: &Path, config_dir: Option<&Path>) -> DiscoveryResult {
    let global_config = config_dir
        .map(|dir| dir.join("apptail").join(GLOBAL_CONFIG_NAME))
        .filter(|path| is_file(path));

    let project_config = start
        .ancestors()
        .map(|ancestor| ancestor.join(PROJECT_CONFIG_NAME))
        .find(|path| is_file(path));

    tracing::debug!(?project_config, ?global_config, "config discovery");
    DiscoveryResult {
        project_config,
        global_config,
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("apptail").join(GLOBAL_CONFIG_NAME))
        .filter(|path| is_file(path))
}

fn is_file(path: &Path) -> bool {
    path.try_exists().unwrap_or(false) && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_config_in_start_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(PROJECT_CONFIG_NAME);
        fs::write(&config_path, "lines: 5\n").unwrap();

        let result = discover_from(temp.path(), None);

        assert_eq!(result.project_config, Some(config_path.clone()));
        assert_eq!(result.effective(), Some(config_path.as_path()));
    }

    #[test]
    fn test_finds_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("a").join("b");
        fs::create_dir_all(&subdir).unwrap();
        let config_path = temp.path().join(PROJECT_CONFIG_NAME);
        fs::write(&config_path, "lines: 5\n").unwrap();

        let result = discover_from(&subdir, None);

        assert_eq!(result.project_config, Some(config_path));
    }

    #[test]
    fn test_project_config_wins_over_global() {
        let project = TempDir::new().unwrap();
        let config_home = TempDir::new().unwrap();
        let global_dir = config_home.path().join("apptail");
        fs::create_dir(&global_dir).unwrap();
        let global_path = global_dir.join(GLOBAL_CONFIG_NAME);
        fs::write(&global_path, "lines: 1\n").unwrap();

        let only_global = discover_from(project.path(), Some(config_home.path()));
        assert_eq!(only_global.project_config, None);
        assert_eq!(only_global.effective(), Some(global_path.as_path()));

        let project_path = project.path().join(PROJECT_CONFIG_NAME);
        fs::write(&project_path, "lines: 2\n").unwrap();
        let both = discover_from(project.path(), Some(config_home.path()));
        assert_eq!(both.global_config, Some(global_path));
        assert_eq!(both.effective(), Some(project_path.as_path()));
    }

    #[test]
    fn test_directory_named_like_config_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(PROJECT_CONFIG_NAME)).unwrap();

        let result = discover_from(temp.path(), None);
        assert!(result.project_config.is_none());
    }
}
