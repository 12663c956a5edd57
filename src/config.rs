//! Configuration for markbook

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default comment template file
    #[serde(default = "default_comments_file")]
    pub comments_file: PathBuf,

    /// Default report output file
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_comments_file() -> PathBuf {
    PathBuf::from("comments.txt")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("reports.txt")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comments_file: default_comments_file(),
            output_file: default_output_file(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("markbook").join("config.yml")),
            Some(PathBuf::from("markbook.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
