use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the complete configuration for a release-note scan.
///
/// Covers where to look (repository root, notes subdirectory, branch) and how far
/// to look (earliest version, branch base handling, pre-release collapsing).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Root of the git repository to scan. Supplied by the caller, never
    /// read from a configuration file.
    #[serde(skip)]
    pub reporoot: PathBuf,

    /// Subdirectory, relative to the repository root, holding the note files.
    #[serde(default = "default_notes_subdir")]
    pub notes_subdir: String,

    /// Branch to scan. `None` means the current HEAD.
    #[serde(default)]
    pub branch: Option<String>,

    /// Oldest version to include in the output. `None` means the entire
    /// branch history (or up to the branch base, see `stop_at_branch_base`).
    #[serde(default)]
    pub earliest_version: Option<String>,

    /// Fold alpha/beta/rc buckets into their final release when it exists.
    #[serde(default = "default_true")]
    pub collapse_pre_releases: bool,

    /// Stop scanning where a non-mainline branch diverged from master.
    #[serde(default = "default_true")]
    pub stop_at_branch_base: bool,
}

fn default_notes_subdir() -> String {
    "releasenotes/notes".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reporoot: PathBuf::from("."),
            notes_subdir: default_notes_subdir(),
            branch: None,
            earliest_version: None,
            collapse_pre_releases: true,
            stop_at_branch_base: true,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `relnotes.toml` in current directory
/// 3. `~/.config/.relnotes.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./relnotes.toml").exists() {
        fs::read_to_string("./relnotes.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".relnotes.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
