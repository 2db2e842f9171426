#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

use crate::adapters::http::BoundParams;
use crate::adapters::sqlite::{validate_table_name, DEFAULT_TABLE};
use crate::utils::error::{ProximityError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_radius,
    validate_range, validate_url, Validate,
};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = crate::adapters::http::DEFAULT_TIMEOUT_SECONDS;
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

pub const DATASET_EXTENSIONS: &[&str] = &["csv", "json"];
pub const SQLITE_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Which point store a search runs against.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    File {
        path: String,
    },
    Sqlite {
        path: String,
        table: String,
    },
    Http {
        endpoint: String,
        timeout: Duration,
        params: BoundParams,
    },
}

impl StoreKind {
    /// A local path names a SQLite database when its extension says so and a
    /// dataset file otherwise.
    pub fn for_path(path: impl Into<String>) -> Self {
        let path = path.into();
        if validate_file_extension("store.path", &path, SQLITE_EXTENSIONS).is_ok() {
            StoreKind::Sqlite {
                path,
                table: DEFAULT_TABLE.to_string(),
            }
        } else {
            StoreKind::File { path }
        }
    }
}

impl Validate for StoreKind {
    fn validate(&self) -> Result<()> {
        match self {
            StoreKind::File { path } => {
                validate_path("store.path", path)?;
                validate_file_extension("store.path", path, DATASET_EXTENSIONS)
            }
            StoreKind::Sqlite { path, table } => {
                validate_path("store.path", path)?;
                validate_file_extension("store.path", path, SQLITE_EXTENSIONS)?;
                validate_table_name(table)
            }
            StoreKind::Http {
                endpoint,
                timeout,
                params,
            } => {
                validate_url("store.endpoint", endpoint)?;
                validate_range(
                    "store.timeout_seconds",
                    timeout.as_secs(),
                    1,
                    MAX_TIMEOUT_SECONDS,
                )?;
                validate_non_empty_string("store.min_lat_param", &params.min_lat)?;
                validate_non_empty_string("store.max_lat_param", &params.max_lat)?;
                validate_non_empty_string("store.min_lon_param", &params.min_lon)?;
                validate_non_empty_string("store.max_lon_param", &params.max_lon)
            }
        }
    }
}

pub(crate) fn validate_max_radius(field_name: &str, max_radius_miles: Option<f64>) -> Result<()> {
    if let Some(max) = max_radius_miles {
        validate_radius(field_name, max, None).map_err(|_| ProximityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: max.to_string(),
            reason: "must be a finite, non-negative number of miles".to_string(),
        })?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::core::SearchConfig;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "poi-proximity")]
    #[command(about = "Find stored points of interest within a radius of a location")]
    pub struct CliConfig {
        /// Latitude of the search center, in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        pub latitude: f64,

        /// Longitude of the search center, in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        pub longitude: f64,

        /// Search radius in miles
        #[arg(long, allow_negative_numbers = true)]
        pub miles: f64,

        /// Dataset to search: a .csv or .json file, or a SQLite database (.db)
        #[arg(long)]
        pub dataset: Option<String>,

        /// HTTP range-query endpoint to search instead of a dataset file
        #[arg(long, conflicts_with = "dataset")]
        pub store_endpoint: Option<String>,

        /// Request timeout for the HTTP store, in seconds
        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        /// Reject searches with a larger radius
        #[arg(long)]
        pub max_radius: Option<f64>,

        #[arg(long, help = "Pretty-print the JSON output")]
        pub pretty: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(skip)]
        pub file_store: Option<StoreKind>,
    }

    impl CliConfig {
        /// Command-line values win over the TOML file.
        pub fn merge(mut self, file: Option<&TomlConfig>) -> Result<Self> {
            if let Some(file) = file {
                if self.max_radius.is_none() {
                    self.max_radius = file.max_radius_miles();
                }
                if self.dataset.is_none() && self.store_endpoint.is_none() {
                    self.file_store = Some(file.store_kind()?);
                }
                self.pretty |= file.pretty_output();
            }
            Ok(self)
        }

        pub fn store_kind(&self) -> Result<StoreKind> {
            let kind = if let Some(endpoint) = &self.store_endpoint {
                StoreKind::Http {
                    endpoint: endpoint.clone(),
                    timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
                    params: BoundParams::default(),
                }
            } else if let Some(path) = &self.dataset {
                StoreKind::for_path(path.clone())
            } else {
                self.file_store
                    .clone()
                    .ok_or_else(|| ProximityError::MissingConfigError {
                        field: "--dataset or --store-endpoint".to_string(),
                    })?
            };

            Ok(match (kind, self.timeout_seconds) {
                (StoreKind::Http { endpoint, params, .. }, Some(seconds)) => StoreKind::Http {
                    endpoint,
                    timeout: Duration::from_secs(seconds),
                    params,
                },
                (kind, _) => kind,
            })
        }
    }

    impl SearchConfig for CliConfig {
        fn max_radius_miles(&self) -> Option<f64> {
            self.max_radius
        }

        fn pretty_output(&self) -> bool {
            self.pretty
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_max_radius("max_radius", self.max_radius)?;
            self.store_kind()?.validate()
        }
    }

}
