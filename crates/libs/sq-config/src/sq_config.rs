//! Core configuration types for the TM publisher.

use crate::{prelude::*, sq_server::SqSelectedServer};
use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::sq_server::SqTmServer;

/// Global configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqGlobalConfig {
    /// Configuration version.
    pub version: String,
}

/// What to do with the build when some posts failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SqPostFailurePolicy {
    /// Report failures in the build log and keep the build green.
    #[default]
    Tolerant,
    /// Fail the build when at least one server did not accept the results.
    FailBuild,
}

/// Per-job publisher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqJobConfig {
    /// Job name, unique across the configuration.
    pub name: String,
    /// Registered servers this job notifies on completion.
    #[serde(default)]
    pub selected_servers: Vec<SqSelectedServer>,
    /// Whether the job presents itself to TM as a TA job.
    #[serde(default)]
    pub ta_wrapper: bool,
    /// Partial-failure policy for the posting step.
    #[serde(default)]
    pub on_post_failure: SqPostFailurePolicy,
    /// Build parameters pinned in the job configuration. These always
    /// override parameters synthesized from an inbound trigger.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// User-provided configuration from TOML files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqUserConfig {
    /// Global settings.
    pub global: SqGlobalConfig,
    /// Registered TM servers.
    #[serde(default)]
    pub servers: Vec<SqTmServer>,
    /// Job entries.
    #[serde(default)]
    pub jobs: Vec<SqJobConfig>,
}

impl SqUserConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(file_path: &Path) -> Result<Self> {
        info!("Loading publisher configuration from {:?}", file_path);
        let contents = std::fs::read_to_string(file_path)?;
        Ok(Self::from_toml(&contents)?)
    }

    /// Parse configuration from TOML string. Job names must be unique,
    /// since jobs are addressed by name.
    pub fn from_toml(value: &str) -> Result<Self> {
        let config: Self = toml::from_str(value)?;
        let mut seen = std::collections::HashSet::new();
        for job in &config.jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(Error::DuplicateJobName(job.name.clone()));
            }
        }
        Ok(config)
    }

    /// Look up a job entry by name.
    pub fn job(&self, name: &str) -> Option<&SqJobConfig> {
        self.jobs.iter().find(|job| job.name == name)
    }
}
