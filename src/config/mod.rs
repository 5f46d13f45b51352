//! Configuration loading for cyaction

mod schema;

pub use schema::Config;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".cyactionrc.json";

/// Config file found on disk, with the directory it was loaded from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// Directory containing the config file, if one was found
    pub base_dir: Option<PathBuf>,
}

/// Find and load config file with extends resolution. Searches current directory then parents.
pub fn load_config(work_dir: &Path, custom_path: Option<&Path>) -> Result<LoadedConfig> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if path.exists() {
            Some(path)
        } else {
            anyhow::bail!("Config file not found: {}", path.display());
        }
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            let config = load_config_with_extends(&path, &mut HashSet::new())?;
            Ok(LoadedConfig {
                config,
                base_dir: path.parent().map(Path::to_path_buf),
            })
        }
        None => Ok(LoadedConfig::default()),
    }
}

/// Load a config file and resolve extends chain
fn load_config_with_extends(config_path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Config> {
    // Prevent circular extends
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    if !visited.insert(canonical) {
        anyhow::bail!(
            "Circular extends detected in config: {}",
            config_path.display()
        );
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config: {}", config_path.display()))?;

    if let Some(extends) = config.extends.take() {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut extends_path = config_dir.join(&extends);
        if extends_path.extension().is_none() {
            extends_path = extends_path.with_extension("json");
        }
        if !extends_path.exists() {
            anyhow::bail!(
                "Extended config not found: {} (referenced from {})",
                extends_path.display(),
                config_path.display()
            );
        }
        let base_config = load_config_with_extends(&extends_path, visited)?;
        config.merge_from(base_config);
    }

    Ok(config)
}

/// Search for .cyactionrc.json in directory and its parents
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

/// Build a GlobSet from patterns for path matching
pub fn build_glob_set(patterns: &[impl AsRef<str>]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().map_err(|e| anyhow::anyhow!("{}", e))
}

/// Check if a path should be ignored based on config glob patterns
pub fn is_ignored(path: &Path, ignore_set: &GlobSet) -> bool {
    ignore_set.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_no_config_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(dir.path(), None).unwrap();
        // A config higher up the real filesystem could be found; only check shape
        if loaded.base_dir.is_none() {
            assert_eq!(loaded.config, Config::default());
        }
    }

    #[test]
    fn test_missing_custom_config_errors() {
        let dir = TempDir::new().unwrap();
        let err = load_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_config_found_in_parent() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "actionableCommands": ["tap"] }"#,
        )
        .unwrap();
        let nested = dir.path().join("cypress").join("tests");
        fs::create_dir_all(&nested).unwrap();

        let loaded = load_config(&nested, None).unwrap();
        assert_eq!(loaded.base_dir.as_deref(), Some(dir.path()));
        assert!(loaded.config.command_sets().is_actionable("tap"));
    }

    #[test]
    fn test_is_ignored() {
        let set = build_glob_set(&["**/legacy/**".to_string()]).unwrap();
        assert!(is_ignored(Path::new("foo/legacy/bar.spec.ts"), &set));
        assert!(!is_ignored(Path::new("foo/bar.spec.ts"), &set));
    }

    #[test]
    fn test_glob_set_brace_expansion() {
        let set = build_glob_set(&["**/*.spec.{ts,js}"]).unwrap();
        assert!(set.is_match("cypress/tests/ui/auth.spec.ts"));
        assert!(set.is_match("auth.spec.js"));
        assert!(!set.is_match("auth.spec.tsx"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        assert!(build_glob_set(&["a/[unclosed"]).is_err());
    }

    #[test]
    fn test_config_extends() {
        let dir = TempDir::new().unwrap();

        let base_path = dir.path().join("base.json");
        let mut base_file = fs::File::create(&base_path).unwrap();
        writeln!(
            base_file,
            r#"{{
                "actionableCommands": ["visit", "click"],
                "excludedCommands": ["get"],
                "ignore": ["**/legacy/**"]
            }}"#
        )
        .unwrap();

        let child_path = dir.path().join(CONFIG_FILENAME);
        let mut child_file = fs::File::create(&child_path).unwrap();
        writeln!(
            child_file,
            r#"{{
                "extends": "./base",
                "actionableCommands": ["type"],
                "ignore": ["**/wip/**"]
            }}"#
        )
        .unwrap();

        let config = load_config(dir.path(), None).unwrap().config;

        // Child list overrides base
        assert_eq!(config.actionable_commands, Some(vec!["type".to_string()]));
        // Base list is inherited
        assert_eq!(config.excluded_commands, Some(vec!["get".to_string()]));
        // Ignore patterns accumulate
        assert_eq!(config.ignore, vec!["**/legacy/**", "**/wip/**"]);
    }

    #[test]
    fn test_circular_extends_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();

        let err = load_config(dir.path(), Some(Path::new("a.json"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Circular extends"));
    }
}
