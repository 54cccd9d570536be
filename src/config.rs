//! Runtime configuration.
//!
//! There are no command-line flags; defaults match the CAPA image pipeline and
//! can be overridden through `AMI_CLEANUP_*` environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_OWNER: &str = "self";
pub const DEFAULT_NAME_FILTER: &str = "capa-ami-*";
pub const DEFAULT_CANONICAL_REGION: &str = "us-east-1";
pub const DEFAULT_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "ca-central-1",
    "ap-southeast-2",
];
pub const DEFAULT_AWS_CLI: &str = "aws";
pub const DEFAULT_LOG_FILE: &str = "ami-cleanup.log";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Owner scope passed to the inventory query.
    pub owner: String,
    /// Image name filter, glob style.
    pub name_filter: String,
    /// Region whose images are always lineage roots.
    pub canonical_region: String,
    pub regions: Vec<String>,
    pub aws_cli: String,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            name_filter: DEFAULT_NAME_FILTER.to_string(),
            canonical_region: DEFAULT_CANONICAL_REGION.to_string(),
            regions: DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect(),
            aws_cli: DEFAULT_AWS_CLI.to_string(),
            log_file: env::temp_dir().join(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(owner) = lookup("AMI_CLEANUP_OWNER") {
            config.owner = non_empty(owner, "AMI_CLEANUP_OWNER")?;
        }
        if let Some(filter) = lookup("AMI_CLEANUP_NAME_FILTER") {
            if filter.trim().is_empty() {
                return Err(ConfigError::EmptyNameFilter);
            }
            config.name_filter = filter.trim().to_string();
        }
        if let Some(region) = lookup("AMI_CLEANUP_CANONICAL_REGION") {
            config.canonical_region = non_empty(region, "AMI_CLEANUP_CANONICAL_REGION")?;
        }
        if let Some(regions) = lookup("AMI_CLEANUP_REGIONS") {
            config.regions = parse_regions(&regions);
        }
        if let Some(cli) = lookup("AMI_CLEANUP_AWS_CLI") {
            config.aws_cli = non_empty(cli, "AMI_CLEANUP_AWS_CLI")?;
        }
        if let Some(path) = lookup("AMI_CLEANUP_LOG") {
            config.log_file = PathBuf::from(non_empty(path, "AMI_CLEANUP_LOG")?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        if self.name_filter.trim().is_empty() {
            return Err(ConfigError::EmptyNameFilter);
        }
        Ok(())
    }
}

/// Split a comma separated region list, dropping blanks and duplicates.
fn parse_regions(raw: &str) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for region in raw.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
    }
    regions
}

fn non_empty(value: String, name: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(name));
    }
    Ok(value.to_string())
}
