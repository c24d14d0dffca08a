use crate::core::earnings::EarningsConfig;
use crate::core::error::TrackerError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const DEFAULT_GOAL: i64 = 50_000;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CurrencyPair {
    pub from: String,
    pub to: String,
}

impl Default for CurrencyPair {
    fn default() -> Self {
        CurrencyPair {
            from: "USD".to_string(),
            to: "JPY".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ExchangeRateProviderConfig {
    fn default() -> Self {
        ExchangeRateProviderConfig {
            base_url: "https://open.er-api.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: Some(ExchangeRateProviderConfig::default()),
        }
    }
}

fn default_goal() -> i64 {
    DEFAULT_GOAL
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub currency: CurrencyPair,
    #[serde(default)]
    pub earnings: EarningsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_goal")]
    pub default_goal: i64,
    pub credentials_path: Option<String>,
    pub goals_path: Option<String>,
    pub data_path: Option<String>,
    /// Directory of the loaded config file; relative paths resolve here.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: CurrencyPair::default(),
            earnings: EarningsConfig::default(),
            providers: ProvidersConfig::default(),
            default_goal: DEFAULT_GOAL,
            credentials_path: None,
            goals_path: None,
            data_path: None,
            base_dir: None,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "streampay", "streampay")
        .context("Could not determine project directories")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.earnings.validate()?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn resolve(&self, configured: Option<&str>, file_name: &str) -> Result<PathBuf> {
        match configured {
            Some(p) => {
                let p = PathBuf::from(p);
                match (&self.base_dir, p.is_relative()) {
                    (Some(base), true) => Ok(base.join(p)),
                    _ => Ok(p),
                }
            }
            None => match &self.base_dir {
                Some(base) => Ok(base.join(file_name)),
                None => Ok(project_dirs()?.config_dir().join(file_name)),
            },
        }
    }

    pub fn credentials_file(&self) -> Result<PathBuf> {
        self.resolve(self.credentials_path.as_deref(), "credentials.json")
    }

    pub fn goals_file(&self) -> Result<PathBuf> {
        self.resolve(self.goals_path.as_deref(), "goals.json")
    }

    /// Directory holding one ledger file per user.
    pub fn ledger_dir(&self) -> Result<PathBuf> {
        if self.data_path.is_none() {
            return Ok(project_dirs()?.data_dir().join("reports"));
        }
        self.resolve(self.data_path.as_deref(), "reports")
    }

    pub fn exchange_rate_provider(&self) -> ExchangeRateProviderConfig {
        self.providers.exchange_rate.clone().unwrap_or_default()
    }
}

fn read_json_table<V: serde::de::DeserializeOwned>(
    path: &Path,
) -> std::result::Result<HashMap<String, V>, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// User ID to password table, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    entries: HashMap<String, String>,
}

impl Credentials {
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Credentials { entries }
    }

    pub fn load(path: &Path) -> std::result::Result<Self, TrackerError> {
        read_json_table(path)
            .map(Credentials::from_entries)
            .map_err(|reason| TrackerError::CredentialLoad {
                path: path.to_path_buf(),
                reason,
            })
    }

    /// Loads the table, falling back to an empty one where every login
    /// fails.
    pub fn load_or_empty(path: &Path) -> Self {
        Credentials::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "Continuing without credentials");
            Credentials::default()
        })
    }

    pub fn verify(&self, user_id: &str, password: &str) -> bool {
        self.entries
            .get(user_id)
            .is_some_and(|expected| expected == password)
    }
}

/// Monthly net-pay targets per user.
#[derive(Debug, Clone)]
pub struct Goals {
    entries: HashMap<String, i64>,
    default_goal: i64,
}

impl Default for Goals {
    fn default() -> Self {
        Goals {
            entries: HashMap::new(),
            default_goal: DEFAULT_GOAL,
        }
    }
}

impl Goals {
    pub fn from_entries(entries: HashMap<String, i64>, default_goal: i64) -> Self {
        Goals {
            entries,
            default_goal,
        }
    }

    pub fn load(path: &Path, default_goal: i64) -> std::result::Result<Self, TrackerError> {
        read_json_table(path)
            .map(|entries| Goals::from_entries(entries, default_goal))
            .map_err(|reason| TrackerError::GoalLoad {
                path: path.to_path_buf(),
                reason,
            })
    }

    pub fn load_or_default(path: &Path, default_goal: i64) -> Self {
        Goals::load(path, default_goal).unwrap_or_else(|e| {
            warn!(error = %e, "Using the default goal for every user");
            Goals::from_entries(HashMap::new(), default_goal)
        })
    }

    pub fn goal_for(&self, user_id: &str) -> i64 {
        self.entries
            .get(user_id)
            .copied()
            .unwrap_or(self.default_goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency:
  from: "USD"
  to: "JPY"
earnings:
  reward_rate: 0.55
  tax_rate: 0.1021
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
    timeout_secs: 3
default_goal: 80000
credentials_path: "creds.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency.from, "USD");
        assert_eq!(config.currency.to, "JPY");
        assert_eq!(config.earnings.reward_rate, 0.55);
        assert_eq!(config.default_goal, 80000);
        let provider = config.exchange_rate_provider();
        assert_eq!(provider.base_url, "http://example.com/rates");
        assert_eq!(provider.timeout_secs, 3);
        assert_eq!(config.credentials_path.as_deref(), Some("creds.json"));
        assert!(config.goals_path.is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.currency.from, "USD");
        assert_eq!(config.currency.to, "JPY");
        assert_eq!(config.earnings, EarningsConfig::default());
        assert_eq!(config.default_goal, DEFAULT_GOAL);
        let provider = config.exchange_rate_provider();
        assert_eq!(provider.base_url, "https://open.er-api.com");
        assert_eq!(provider.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_path_resolves_relative_files() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "credentials_path: creds.json\ndata_path: ledgers\n",
        )?;

        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.credentials_file()?, dir.path().join("creds.json"));
        assert_eq!(config.goals_file()?, dir.path().join("goals.json"));
        assert_eq!(config.ledger_dir()?, dir.path().join("ledgers"));
        Ok(())
    }

    #[test]
    fn test_load_from_path_rejects_bad_rates() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "earnings:\n  reward_rate: 0.6\n  tax_rate: 1.5\n")?;

        let result = AppConfig::load_from_path(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tax_rate"));
        Ok(())
    }

    #[test]
    fn test_credentials_verify() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"hana": "s3cret", "rio": "pass"}"#)?;

        let creds = Credentials::load(&path)?;
        assert!(creds.verify("hana", "s3cret"));
        assert!(!creds.verify("hana", "wrong"));
        assert!(!creds.verify("nobody", "s3cret"));
        Ok(())
    }

    #[test]
    fn test_missing_credentials_degrade_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let err = Credentials::load(&path).unwrap_err();
        assert!(matches!(err, TrackerError::CredentialLoad { .. }));

        let creds = Credentials::load_or_empty(&path);
        assert!(!creds.verify("hana", ""));
        assert!(!creds.verify("", ""));
    }

    #[test]
    fn test_goals_default_and_override() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("goals.json");
        fs::write(&path, r#"{"hana": 120000}"#)?;

        let goals = Goals::load(&path, DEFAULT_GOAL)?;
        assert_eq!(goals.goal_for("hana"), 120000);
        assert_eq!(goals.goal_for("rio"), 50000);
        Ok(())
    }

    #[test]
    fn test_malformed_goals_degrade_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goals.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Goals::load(&path, DEFAULT_GOAL),
            Err(TrackerError::GoalLoad { .. })
        ));
        let goals = Goals::load_or_default(&path, 70000);
        assert_eq!(goals.goal_for("hana"), 70000);
    }
}
