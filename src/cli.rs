use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;
use crate::error::ConfigError;

#[derive(Parser, Debug)]
#[command(
    name = "org_reconciler",
    version,
    about = "Reconcile a CRM company export against ALF/SNF facility feeds",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Directory holding the input CSV files (env: RECONCILER_INPUT_DIR)
    #[arg(value_name = "INPUT_DIR", env = "RECONCILER_INPUT_DIR")]
    pub input_dir: PathBuf,
    /// Directory for the generated output files (env: RECONCILER_OUTPUT_DIR)
    #[arg(
        value_name = "OUTPUT_DIR",
        env = "RECONCILER_OUTPUT_DIR",
        default_value = "output"
    )]
    pub output_dir: PathBuf,
    /// Optional TOML file overriding matcher and normalizer settings
    /// (env: RECONCILER_CONFIG)
    #[arg(long = "config", value_name = "FILE", env = "RECONCILER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        match &self.config {
            Some(path) => AppConfig::from_toml_file(path),
            None => {
                let cfg = AppConfig::default();
                cfg.validate()?;
                Ok(cfg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_defaults() {
        let cli = Cli::parse_from(["org_reconciler", "data/in"]);
        assert_eq!(cli.input_dir, PathBuf::from("data/in"));
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_is_accepted() {
        let cli = Cli::parse_from(["org_reconciler", "in", "out", "--config", "settings.toml"]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.config, Some(PathBuf::from("settings.toml")));
    }
}
