use droplet_parser::ParseOptions;
use droplet_view::ViewOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "droplet.config.json";

/// Droplet configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Layout constants and block colors
    #[serde(default)]
    pub view: ViewOptions,

    #[serde(default = "default_true")]
    pub wrap_at_root: bool,

    /// Fail on unparseable lines instead of wrapping them
    #[serde(default)]
    pub throw_errors: bool,

    /// File extensions picked up when a directory is given
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

impl Config {
    /// Load `explicit` if given (it must exist), else the default config in
    /// `cwd`, else the defaults
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = cwd.join(DEFAULT_CONFIG_NAME);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", config_path.display(), e))?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            wrap_at_root: self.wrap_at_root,
            throw_error: self.throw_errors,
        }
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.iter().any(|x| x == e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view: ViewOptions::default(),
            wrap_at_root: true,
            throw_errors: false,
            extensions: default_extensions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r##"{
            "view": { "padding": 8, "colors": { "command": "#ff0000" } },
            "throwErrors": true,
            "extensions": ["py", "drop"]
        }"##;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.view.padding, 8.0);
        assert_eq!(config.view.color_for("command").to_hex(), "#ff0000");
        assert!(config.wrap_at_root);
        assert!(config.throw_errors);
        assert!(config.matches_extension(Path::new("a/b.drop")));
        assert!(!config.matches_extension(Path::new("a/b.txt")));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config, serde_json::from_str::<Config>("{}").unwrap());
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let dir = std::env::temp_dir().join("droplet-config-missing");
        let config = Config::load(&dir, None).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::load(&dir, Some(&dir.join("nope.json"))).is_err());
    }
}
