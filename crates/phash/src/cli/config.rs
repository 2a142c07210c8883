//! The `phash config` command for configuration management.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use phash_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
///
/// `config` is the already-loaded effective configuration; `override_path`
/// is the `--config` file, if one was given.
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    override_path: Option<&Path>,
) -> anyhow::Result<()> {
    let path = config_path(override_path);

    match args.command {
        ConfigCommand::Show => {
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            init_config(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn config_path(override_path: Option<&Path>) -> PathBuf {
    match override_path {
        Some(path) => phash_core::config::expand_tilde(path),
        None => Config::default_path(),
    }
}

/// Write a default config file at `path`, creating parent directories.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_config(&path, false).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.hash.similarity_threshold, 10);
        assert_eq!(loaded.processing.parallel_workers, 4);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hash]\nsimilarity_threshold = 3\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("= 3"));

        init_config(&path, true).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.hash.similarity_threshold, 10);
    }

    #[test]
    fn override_path_takes_precedence() {
        let explicit = Path::new("/etc/phash/custom.toml");
        assert_eq!(config_path(Some(explicit)), explicit);
        assert_eq!(config_path(None), Config::default_path());
    }
}
