pub mod toml_config;

pub use toml_config::TriageConfig;

#[cfg(feature = "cli")]
use crate::utils::error::{Result, TriageError};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_positive_number, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "civic-triage")]
#[command(about = "Classifies citizen-reported civic issues from their media attachments")]
pub struct CliConfig {
    #[arg(long, help = "JSON file holding the submission to process")]
    pub input: Option<String>,

    #[arg(long, help = "Process without persisting; print the enriched issue")]
    pub dry_run: bool,

    #[arg(long, help = "List recently stored issues")]
    pub list: bool,

    #[arg(long, default_value = "20", help = "Row count for --list")]
    pub limit: u64,

    #[arg(long, help = "Probe collaborator availability and config completeness")]
    pub check: bool,

    #[arg(long, help = "TOML configuration file (environment variables otherwise)")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON-formatted logs")]
    pub log_json: bool,

    #[arg(long, help = "Log process resource stats")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let modes = [self.input.is_some(), self.list, self.check]
            .iter()
            .filter(|selected| **selected)
            .count();
        if modes != 1 {
            return Err(TriageError::ConfigError {
                message: "choose exactly one of --input, --list or --check".to_string(),
            });
        }
        validate_positive_number("limit", self.limit, 1)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn config() -> CliConfig {
        CliConfig {
            input: None,
            dry_run: false,
            list: false,
            limit: 20,
            check: false,
            config: None,
            verbose: false,
            log_json: false,
            monitor: false,
        }
    }

    #[test]
    fn test_exactly_one_mode_is_required() {
        assert!(config().validate().is_err());

        let mut with_input = config();
        with_input.input = Some("submission.json".to_string());
        assert!(with_input.validate().is_ok());

        let mut both = config();
        both.input = Some("submission.json".to_string());
        both.list = true;
        assert!(both.validate().is_err());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let mut listing = config();
        listing.list = true;
        listing.limit = 0;
        assert!(listing.validate().is_err());
    }
}
