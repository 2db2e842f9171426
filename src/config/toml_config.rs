use crate::adapters::http::BoundParams;
use crate::adapters::sqlite::DEFAULT_TABLE;
use crate::config::{validate_max_radius, StoreKind, DEFAULT_TIMEOUT_SECONDS};
use crate::core::SearchConfig;
use crate::utils::error::{ProximityError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub search: Option<SearchSection>,
    pub store: StoreSection,
    pub output: Option<OutputSection>,
    /// Directory relative store paths are resolved against: the directory of
    /// the file the configuration was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSection {
    pub max_radius_miles: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub r#type: String,
    pub path: Option<String>,
    pub table: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub min_lat_param: Option<String>,
    pub max_lat_param: Option<String>,
    pub min_lon_param: Option<String>,
    pub max_lon_param: Option<String>,
}

impl StoreSection {
    fn bound_params(&self) -> BoundParams {
        let defaults = BoundParams::default();
        BoundParams {
            min_lat: self.min_lat_param.clone().unwrap_or(defaults.min_lat),
            max_lat: self.max_lat_param.clone().unwrap_or(defaults.max_lat),
            min_lon: self.min_lon_param.clone().unwrap_or(defaults.min_lon),
            max_lon: self.max_lon_param.clone().unwrap_or(defaults.max_lon),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub pretty: Option<bool>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file. Relative store paths in it are
    /// taken relative to the file's own directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ProximityError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProximityError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProximityError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn store_kind(&self) -> Result<StoreKind> {
        match self.store.r#type.as_str() {
            "file" => {
                let path = validate_required_field("store.path", &self.store.path)?;
                Ok(StoreKind::File {
                    path: self.resolve_path(path),
                })
            }
            "sqlite" => {
                let path = validate_required_field("store.path", &self.store.path)?;
                Ok(StoreKind::Sqlite {
                    path: self.resolve_path(path),
                    table: self
                        .store
                        .table
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                })
            }
            "http" => {
                let endpoint = validate_required_field("store.endpoint", &self.store.endpoint)?;
                Ok(StoreKind::Http {
                    endpoint: endpoint.clone(),
                    timeout: Duration::from_secs(
                        self.store.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                    ),
                    params: self.store.bound_params(),
                })
            }
            other => Err(ProximityError::InvalidConfigValueError {
                field: "store.type".to_string(),
                value: other.to_string(),
                reason: "Unsupported store type. Valid types: file, sqlite, http".to_string(),
            }),
        }
    }

    fn resolve_path(&self, path: &str) -> String {
        match &self.base_dir {
            Some(dir) if Path::new(path).is_relative() => dir.join(path).to_string_lossy().into_owned(),
            _ => path.to_string(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_max_radius("search.max_radius_miles", self.max_radius_miles())?;
        self.store_kind()?.validate()
    }
}

impl SearchConfig for TomlConfig {
    fn max_radius_miles(&self) -> Option<f64> {
        self.search.as_ref().and_then(|s| s.max_radius_miles)
    }

    fn pretty_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
