use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use folio_core::Mode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Pipeline configuration (from folio-core)
    #[serde(flatten)]
    pub site: folio_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Source directory containing markdown files
    pub source: String,
    /// Where the JSON manifest is written
    pub output: String,
    /// Configuration file path
    pub config: String,
    /// Whether drafts are listed
    pub mode: Mode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: "./content".to_string(),
            output: "./public/manifest.json".to_string(),
            config: "./folio.toml".to_string(),
            mode: Mode::Published,
        }
    }
}

impl FolioConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (FOLIO_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let defaults = Self::default();
        let config_file = string_arg(args, "config").unwrap_or_else(|| defaults.build.config.clone());

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        builder = builder.add_source(ConfigBuilder::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            tracing::debug!("Reading config file {config_file}");
            builder = builder.add_source(File::new(&config_file, FileFormat::Toml));
        }

        // 3. Add environment variables with FOLIO_ prefix
        builder = builder.add_source(
            Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments that were actually given
        builder = builder.set_override("build.config", config_file)?;
        if let Some(source) = string_arg(args, "source") {
            builder = builder.set_override("build.source", source)?;
        }
        if let Some(output) = string_arg(args, "output") {
            builder = builder.set_override("build.output", output)?;
        }
        if flag_arg(args, "preview") {
            builder = builder.set_override("build.mode", Mode::Preview.to_string())?;
        }

        let config = builder.build()?;
        let folio_config: FolioConfig = config.try_deserialize()?;

        Ok(folio_config)
    }

    pub fn source_dir(&self) -> PathBuf {
        PathBuf::from(&self.build.source)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.build.output)
    }

    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(&self.build.config)
    }
}

// Only read args that are defined for the running subcommand.
fn string_arg(args: &ArgMatches, id: &str) -> Option<String> {
    args.try_get_one::<String>(id).ok().flatten().cloned()
}

fn flag_arg(args: &ArgMatches, id: &str) -> bool {
    args.try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("FILE"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
            .arg(Arg::new("preview").long("preview").action(ArgAction::SetTrue))
    }

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.build.source, "./content");
        assert_eq!(config.build.output, "./public/manifest.json");
        assert_eq!(config.build.mode, Mode::Published);
        assert_eq!(config.site.pipeline.permalink_prefix, "");
    }

    #[test]
    fn test_cli_args_override() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("folio.toml");
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/source",
                "--output",
                "/custom/out.json",
                "--config",
                missing.to_str().unwrap(),
                "--preview",
            ])
            .unwrap();

        let config = FolioConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "/custom/source");
        assert_eq!(config.build.output, "/custom/out.json");
        assert_eq!(config.build.mode, Mode::Preview);
        // Should still have defaults for non-overridden values
        assert_eq!(config.site.pipeline.related_limit, 3);
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            "[build]\nsource = \"./posts\"\n\n[pipeline]\npermalink_prefix = \"blog\"\nrelated_limit = 5\n",
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", path.to_str().unwrap()])
            .unwrap();

        let config = FolioConfig::load(&matches).unwrap();
        assert_eq!(config.build.source, "./posts");
        assert_eq!(config.site.pipeline.permalink_prefix, "blog");
        assert_eq!(config.site.pipeline.related_limit, 5);
        assert_eq!(config.site.pipeline.tag_prefix, "tags");
    }

    #[test]
    fn test_undefined_args_are_ignored() {
        let matches = Command::new("bare").try_get_matches_from(vec!["bare"]).unwrap();
        assert_eq!(string_arg(&matches, "output"), None);
        assert!(!flag_arg(&matches, "preview"));
    }
}
