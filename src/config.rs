use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Deployment environment the tool is pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DorEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl DorEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            DorEnvironment::Development => "development",
            DorEnvironment::Test => "test",
            DorEnvironment::Production => "production",
        }
    }

    /// Stacks host serving shelved files for this environment
    pub fn stacks_server(&self) -> &'static str {
        match self {
            DorEnvironment::Development => "stacks-dev",
            DorEnvironment::Test => "stacks-test",
            DorEnvironment::Production => "stacks",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, DorEnvironment::Production)
    }

    /// Resolve from the first of DOR_ADMIN_ENVIRONMENT, ROBOT_ENVIRONMENT, RAILS_ENV
    pub fn from_env() -> Result<Self> {
        for var in ["DOR_ADMIN_ENVIRONMENT", "ROBOT_ENVIRONMENT", "RAILS_ENV"] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    return value.parse().with_context(|| format!("invalid {var}"));
                }
            }
        }
        Ok(DorEnvironment::default())
    }
}

impl fmt::Display for DorEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DorEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(DorEnvironment::Development),
            "test" => Ok(DorEnvironment::Test),
            "production" | "prod" => Ok(DorEnvironment::Production),
            other => Err(anyhow::anyhow!("unknown environment '{other}'")),
        }
    }
}

/// Main configuration structure for dor-admin
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DorConfig {
    /// Resolved at startup, never read from files
    #[serde(skip_deserializing)]
    pub environment: DorEnvironment,
    /// Base URL for public object pages
    pub purl_base_url: String,
    pub workflow: WorkflowServiceConfig,
    pub fedora: FedoraConfig,
    pub solr: SolrConfig,
    pub dor_services: DorServicesConfig,
    pub stacks: StacksConfig,
    pub workspace: WorkspaceConfig,
    pub robots: RobotsConfig,
    pub logging: LoggingConfig,
}

impl Default for DorConfig {
    fn default() -> Self {
        Self {
            environment: DorEnvironment::default(),
            purl_base_url: "http://purl.stanford.edu".to_string(),
            workflow: WorkflowServiceConfig::default(),
            fedora: FedoraConfig::default(),
            solr: SolrConfig::default(),
            dor_services: DorServicesConfig::default(),
            stacks: StacksConfig::default(),
            workspace: WorkspaceConfig::default(),
            robots: RobotsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowServiceConfig {
    /// Base URL of the workflow status service
    pub url: String,
    /// Repository name used in workflow paths
    pub repository: String,
}

impl Default for WorkflowServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/workflow".to_string(),
            repository: "dor".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FedoraConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for FedoraConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/fedora".to_string(),
            user: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolrConfig {
    pub url: String,
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8983/solr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DorServicesConfig {
    /// Endpoint that re-publishes derived metadata
    pub url: String,
}

impl Default for DorServicesConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StacksConfig {
    /// Overrides the environment-derived stacks host
    pub host: Option<String>,
    pub user: String,
    pub root: PathBuf,
}

impl Default for StacksConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: "lyberadmin".to_string(),
            root: PathBuf::from("/stacks"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace holding per-object symlinks
    pub dor: PathBuf,
    /// Assembly staging area
    pub assembly: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dor: PathBuf::from("/dor/workspace"),
            assembly: PathBuf::from("/dor/assembly"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub accession_root: String,
    pub assembly_root: String,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            accession_root: "/home/lyberadmin/common-accessioning/current".to_string(),
            assembly_root: "/home/lyberadmin/assembly/current".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl DorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. dor-admin.toml in the working directory
    /// 3. config/environments/<environment>.toml
    /// 4. An explicit file passed on the command line
    /// 5. Environment variables (prefixed with DOR_ADMIN, `__` between sections)
    pub fn load(environment: DorEnvironment, explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("dor-admin.toml").exists() {
            builder = builder.add_source(File::with_name("dor-admin"));
        }

        let env_file = format!("config/environments/{environment}.toml");
        if Path::new(&env_file).exists() {
            builder = builder.add_source(File::with_name(&env_file));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("DOR_ADMIN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("failed to read configuration")?;
        let mut dor_config: DorConfig = config
            .try_deserialize()
            .context("failed to parse configuration")?;

        dor_config.environment = environment;

        Ok(dor_config)
    }

    /// Stacks host for the active environment, unless overridden
    pub fn stacks_host(&self) -> &str {
        self.stacks
            .host
            .as_deref()
            .unwrap_or_else(|| self.environment.stacks_server())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacks_server_per_environment() {
        assert_eq!(DorEnvironment::Development.stacks_server(), "stacks-dev");
        assert_eq!(DorEnvironment::Test.stacks_server(), "stacks-test");
        assert_eq!(DorEnvironment::Production.stacks_server(), "stacks");
    }

    #[test]
    fn test_stacks_host_override() {
        let mut config = DorConfig::default();
        assert_eq!(config.stacks_host(), "stacks-dev");
        config.stacks.host = Some("stacks-local".to_string());
        assert_eq!(config.stacks_host(), "stacks-local");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "Production".parse::<DorEnvironment>().unwrap(),
            DorEnvironment::Production
        );
        assert_eq!("dev".parse::<DorEnvironment>().unwrap(), DorEnvironment::Development);
        assert!("staging".parse::<DorEnvironment>().is_err());
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[workflow]\nurl = \"http://wf.example/workflow\"\n\n[workspace]\nassembly = \"/tmp/assembly\"\n",
        )
        .unwrap();

        let config = DorConfig::load(DorEnvironment::Test, Some(&path)).unwrap();
        assert_eq!(config.environment, DorEnvironment::Test);
        assert_eq!(config.workflow.url, "http://wf.example/workflow");
        assert_eq!(config.workflow.repository, "dor");
        assert_eq!(config.workspace.assembly, PathBuf::from("/tmp/assembly"));
        assert_eq!(config.workspace.dor, PathBuf::from("/dor/workspace"));
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = DorConfig::default();
        config.solr.url = "http://solr.example/solr".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = DorConfig::load(DorEnvironment::Development, Some(&path)).unwrap();
        assert_eq!(loaded.solr.url, "http://solr.example/solr");
        assert_eq!(loaded.purl_base_url, "http://purl.stanford.edu");
    }
}
