//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command against the file at `path`.
pub async fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(config, formatter),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(config, path, force, formatter),
        ConfigAction::Set { key, value } => set_value(config, path, &key, &value, formatter),
    }
}

/// Print the configuration.
fn show_config(config: &Config, formatter: &Formatter) -> Result<()> {
    match formatter.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        _ => print!("{}", config.to_toml()?),
    }
    Ok(())
}

/// Write the default configuration unless a file already exists.
fn init_config(config: &mut Config, path: &Path, force: bool, formatter: &Formatter) -> Result<()> {
    if path.exists() && !force {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ))
        );
        return Ok(());
    }

    *config = Config::default();
    config.save_to(path)?;
    println!(
        "{}",
        formatter.success(&format!("Wrote default configuration to {}", path.display()))
    );
    Ok(())
}

/// Update one value and save.
fn set_value(
    config: &mut Config,
    path: &Path,
    key: &str,
    value: &str,
    formatter: &Formatter,
) -> Result<()> {
    config.set(key, value)?;
    config.save_to(path)?;
    println!("{}", formatter.success(&format!("Set {} = {}", key, value)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut config = Config::default();

        init_config(&mut config, &path, false, &formatter).unwrap();
        assert!(path.exists());

        set_value(&mut config, &path, "llm.model", "mistral", &formatter).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.llm.model, "mistral");
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        std::fs::write(&path, "[llm]\nmodel = \"qwen2\"\n").unwrap();

        let mut config = Config::load_from(&path).unwrap();
        init_config(&mut config, &path, false, &formatter).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().llm.model, "qwen2");

        init_config(&mut config, &path, true, &formatter).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_rejected_value_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut config = Config::default();
        config.save_to(&path).unwrap();

        assert!(set_value(&mut config, &path, "pipeline.chunk_overlap", "900", &formatter).is_err());
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
