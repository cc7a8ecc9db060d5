//! `labval config` subcommands.
//!
//! Settings are addressed by dotted keys into the TOML form of
//! [`LabvalConfig`], e.g. `server.port` or `execution.step_delay_ms`.
//! Each handler returns the text to print so it can be checked directly.

use std::path::{Path, PathBuf};

use crate::cli::ConfigAction;
use crate::config::{LabvalConfig, PROJECT_NAME};
use crate::error::{Error, Result};

/// Runs a config subcommand and prints its output.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    let output = match action {
        ConfigAction::Path => show_path(config_path)?,
        ConfigAction::Get { key } => get(config_path, &key)?,
        ConfigAction::Set { key, value } => set(config_path, &key, &value)?,
        ConfigAction::Init { file, force } => init(file.as_deref().or(config_path), force)?,
        ConfigAction::Export { docker_env } => {
            export(&LabvalConfig::load(config_path)?, docker_env)?
        }
    };
    print!("{output}");
    Ok(())
}

fn config_file(config_path: Option<&str>) -> Result<PathBuf> {
    LabvalConfig::resolve_config_path(config_path).ok_or_else(|| {
        Error::config("no config directory on this platform; pass --config <FILE>")
    })
}

/// The config file in use, with a hint when it has not been created.
pub fn show_path(config_path: Option<&str>) -> Result<String> {
    let path = config_file(config_path)?;
    let mut out = format!("{}\n", path.display());
    if !path.exists() {
        out.push_str(&format!(
            "(missing; `{PROJECT_NAME} config init` writes the defaults)\n"
        ));
    }
    Ok(out)
}

/// The effective value of one setting, defaults included.
pub fn get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = LabvalConfig::load(config_path)?;
    let tree = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    let value = lookup(&tree, key)
        .ok_or_else(|| Error::config(format!("'{key}' is not a {PROJECT_NAME} setting")))?;
    Ok(format!("{}\n", display_value(value)))
}

/// Updates one setting in an existing config file.
///
/// The file is rewritten only if the result still loads.
pub fn set(config_path: Option<&str>, key: &str, raw: &str) -> Result<String> {
    let path = config_file(config_path)?;
    if !path.exists() {
        return Err(Error::config(format!(
            "{} does not exist; create it with `{PROJECT_NAME} config init`",
            path.display()
        )));
    }

    let mut tree = read_tree(&path)?;
    assign(&mut tree, key, parse_scalar(raw))?;
    let rendered = toml::to_string_pretty(&tree).map_err(|e| Error::config(e.to_string()))?;
    toml::from_str::<LabvalConfig>(&rendered)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?
        .validate()?;
    std::fs::write(&path, rendered).map_err(|e| Error::io_with_path(e, &path))?;

    tracing::debug!(%key, path = %path.display(), "Config value updated");
    Ok(format!("{key} = {raw} ({})\n", path.display()))
}

/// Writes the default configuration to `file` or the default location.
pub fn init(file: Option<&str>, force: bool) -> Result<String> {
    let path = match file {
        Some(file) => PathBuf::from(file),
        None => config_file(None)?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to replace it",
            path.display()
        )));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;
    }
    std::fs::write(&path, LabvalConfig::default().to_toml_string()?)
        .map_err(|e| Error::io_with_path(e, &path))?;
    Ok(format!("wrote {}\n", path.display()))
}

/// One `KEY=value` line per setting, or `--env KEY=value` for `docker run`.
pub fn export(config: &LabvalConfig, docker_env: bool) -> Result<String> {
    let prefix = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}\n"))
        .collect())
}

fn read_tree(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
}

/// Follows a dotted key through nested tables.
pub fn lookup<'a>(tree: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(tree, |node, segment| node.as_table()?.get(segment))
}

/// Stores `value` under a dotted key, adding missing sections.
pub fn assign(tree: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (sections, leaf) = match key.rsplit_once('.') {
        Some((sections, leaf)) => (Some(sections), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(Error::config(format!("'{key}' does not name a setting")));
    }
    let through_value = || Error::config(format!("'{key}' runs through a plain value"));

    let mut node = tree;
    for section in sections.into_iter().flat_map(|s| s.split('.')) {
        let table = node.as_table_mut().ok_or_else(through_value)?;
        if !table.contains_key(section) {
            table.insert(section.to_string(), toml::Value::Table(toml::map::Map::new()));
        }
        node = table.get_mut(section).ok_or_else(through_value)?;
    }
    node.as_table_mut()
        .ok_or_else(through_value)?
        .insert(leaf.to_string(), value);
    Ok(())
}

/// Reads a command-line value as a bool, integer or float, else a string.
pub fn parse_scalar(raw: &str) -> toml::Value {
    if let Ok(flag) = raw.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else if let Ok(int) = raw.parse::<i64>() {
        toml::Value::Integer(int)
    } else if let Ok(float) = raw.parse::<f64>() {
        toml::Value::Float(float)
    } else {
        toml::Value::String(raw.to_string())
    }
}

/// Strings unquoted, sections and arrays as TOML.
pub fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(_) | toml::Value::Array(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn default_file(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("config.toml");
        init(Some(path.to_str().unwrap()), false).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_show_path_flags_missing_file() {
        let out = show_path(Some("/nonexistent/labval.toml")).unwrap();
        assert!(out.starts_with("/nonexistent/labval.toml\n"));
        assert!(out.contains("config init"));

        let dir = tempfile::TempDir::new().unwrap();
        let file = default_file(&dir);
        assert_eq!(show_path(Some(&file)).unwrap(), format!("{file}\n"));
    }

    #[test]
    fn test_get_reads_defaults_without_file() {
        assert_eq!(
            get(Some("/nonexistent/labval.toml"), "server.port").unwrap(),
            "3001\n"
        );
        assert_eq!(
            get(Some("/nonexistent/labval.toml"), "client.base_url").unwrap(),
            "http://localhost:3001\n"
        );
    }

    #[test]
    fn test_get_unknown_key() {
        let err = get(Some("/nonexistent/labval.toml"), "server.tls").unwrap_err();
        assert!(err.to_string().contains("'server.tls' is not a labval setting"));
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = default_file(&dir);

        let out = set(Some(&file), "execution.step_delay_ms", "500").unwrap();
        assert!(out.starts_with("execution.step_delay_ms = 500"));
        assert_eq!(get(Some(&file), "execution.step_delay_ms").unwrap(), "500\n");
        assert_eq!(
            LabvalConfig::load(Some(&file)).unwrap().execution.step_delay_ms,
            500
        );
    }

    #[test]
    fn test_set_keeps_file_on_wrong_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = default_file(&dir);
        let before = std::fs::read_to_string(&file).unwrap();

        let err = set(Some(&file), "server.port", "eighty").unwrap_err();
        assert!(err.to_string().contains("Invalid value for 'server.port'"));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
    }

    #[test]
    fn test_set_rejects_nan_probability() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = default_file(&dir);
        let before = std::fs::read_to_string(&file).unwrap();

        let err = set(Some(&file), "execution.pass_probability", "nan").unwrap_err();
        assert!(err.to_string().contains("pass_probability must be between 0 and 1"));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
    }

    #[test]
    fn test_set_needs_existing_file() {
        let err = set(Some("/nonexistent/labval.toml"), "server.port", "1").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_init_writes_every_section() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("labval.toml");

        let out = init(Some(path.to_str().unwrap()), false).unwrap();
        assert!(out.starts_with("wrote "));
        let content = std::fs::read_to_string(&path).unwrap();
        for section in ["[server]", "[storage]", "[execution]", "[client]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "stale").unwrap();

        let err = init(Some(path.to_str().unwrap()), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "stale");

        init(Some(path.to_str().unwrap()), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[server]"));
    }

    #[test]
    fn test_export_formats() {
        let config = LabvalConfig::default();
        let plain = export(&config, false).unwrap();
        assert!(plain.lines().any(|l| l == "LABVAL_SERVER_PORT=3001"));
        let docker = export(&config, true).unwrap();
        assert!(docker.lines().all(|l| l.starts_with("--env LABVAL_")));
    }

    #[test]
    fn test_lookup() {
        let tree: toml::Value = toml::from_str("[storage]\nbackend = \"memory\"").unwrap();
        assert_eq!(
            lookup(&tree, "storage.backend"),
            Some(&toml::Value::String("memory".into()))
        );
        assert!(lookup(&tree, "storage.backend.kind").is_none());
        assert!(lookup(&tree, "server").is_none());
    }

    #[test]
    fn test_assign_adds_sections() {
        let mut tree = toml::Value::Table(toml::map::Map::new());
        assign(&mut tree, "storage.backend", parse_scalar("redb")).unwrap();
        assign(&mut tree, "verbose", parse_scalar("true")).unwrap();
        assert_eq!(
            lookup(&tree, "storage.backend"),
            Some(&toml::Value::String("redb".into()))
        );
        assert_eq!(lookup(&tree, "verbose"), Some(&toml::Value::Boolean(true)));
    }

    #[test]
    fn test_assign_rejects_bad_paths() {
        let mut tree: toml::Value = toml::from_str("port = 1").unwrap();
        assert!(assign(&mut tree, "port.inner", parse_scalar("2")).is_err());
        assert!(assign(&mut tree, "", parse_scalar("2")).is_err());
        assert!(assign(&mut tree, "server.", parse_scalar("2")).is_err());
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("false"), toml::Value::Boolean(false));
        assert_eq!(parse_scalar("3001"), toml::Value::Integer(3001));
        assert_eq!(parse_scalar("0.25"), toml::Value::Float(0.25));
        assert_eq!(parse_scalar("memory"), toml::Value::String("memory".into()));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&toml::Value::String("redb".into())), "redb");
        assert_eq!(display_value(&toml::Value::Integer(3001)), "3001");
        assert_eq!(display_value(&toml::Value::Boolean(true)), "true");
    }
}
