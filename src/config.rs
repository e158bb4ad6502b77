//! Saved default flags.
//!
//! Config files hold the same tokens as the command line, one or more per
//! line, with `#` comments. The global file is overlaid by `.braillemaprc` in
//! the working directory, and explicit CLI flags win over both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// How query results are printed.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl OutputFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub format: Option<OutputFormat>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Overlay `other` on `self`: booleans are or-ed, options from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            format: other.format.or(self.format),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("braillemap").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("braillemap")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("braillemap").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("braillemap")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".braillemaprc")
}

/// Read flags from `path`. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// # Errors
/// Returns an error if the config directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# braillemap defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(format) = flags.format {
        lines.push(format!("--format {}", format.as_str()));
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
/// Returns an error if an existing config file cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token stream. Unknown tokens are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--watch" || token == "-w" {
            flags.watch = true;
        } else if token == "--perf" {
            flags.perf = true;
        } else if token == "--format" {
            if let Some(next) = tokens.get(i + 1) {
                flags.format = parse_format(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--format=") {
            flags.format = parse_format(value);
        } else if token == "--debug-log" {
            if let Some(next) = tokens.get(i + 1) {
                flags.debug_log = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--debug-log=") {
            flags.debug_log = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_format(s: &str) -> Option<OutputFormat> {
    match s {
        "plain" => Some(OutputFormat::Plain),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "braillemap",
            "--watch",
            "--format",
            "json",
            "--debug-log=sync.log",
            "book.json",
            "text",
            "12",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(!flags.perf);
        assert_eq!(flags.format, Some(OutputFormat::Json));
        assert_eq!(flags.debug_log, Some(PathBuf::from("sync.log")));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unknown_format() {
        let flags = parse_flag_tokens(&tokens(&["--format", "yaml"]));
        assert_eq!(flags.format, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            format: Some(OutputFormat::Plain),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            format: Some(OutputFormat::Json),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.perf);
        assert_eq!(merged.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".braillemaprc");
        let flags = ConfigFlags {
            watch: true,
            perf: true,
            format: Some(OutputFormat::Json),
            debug_log: Some(PathBuf::from("sync.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
