use clap::Parser;
use poi_proximity::config::toml_config::TomlConfig;
use poi_proximity::core::{PointStore, SearchConfig};
use poi_proximity::utils::error::ErrorSeverity;
use poi_proximity::utils::{logger, validation::Validate};
use poi_proximity::{
    render_json, CliConfig, DatasetPointStore, HttpPointStore, LocalStorage, ProximityError,
    ProximityQuery, ProximitySearch, SqlitePointStore, StoreKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();
    logger::init_cli_logger(args.verbose);

    let file_config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            let file = TomlConfig::from_file(path).unwrap_or_else(|e| fail(&e));
            if let Err(e) = file.validate() {
                tracing::error!("Configuration file {} is invalid: {}", path, e);
                fail(&e);
            }
            Some(file)
        }
        None => None,
    };
    let config = args.merge(file_config.as_ref()).unwrap_or_else(|e| fail(&e));
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        fail(&e);
    }

    let query = ProximityQuery::new(config.latitude, config.longitude, config.miles);
    let outcome = match config.store_kind()? {
        StoreKind::File { path } => {
            let store = DatasetPointStore::new(LocalStorage::new(".".to_string()), path)?;
            run(store, &config, &query).await
        }
        StoreKind::Sqlite { path, table } => {
            let store = SqlitePointStore::new(path, table)?;
            run(store, &config, &query).await
        }
        StoreKind::Http {
            endpoint,
            timeout,
            params,
        } => {
            let store = HttpPointStore::new(endpoint, timeout)?.with_params(params);
            run(store, &config, &query).await
        }
    };

    match outcome {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Proximity search failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e)
        }
    }
}

async fn run<S: PointStore>(
    store: S,
    config: &CliConfig,
    query: &ProximityQuery,
) -> poi_proximity::Result<String> {
    let engine = ProximitySearch::from_config(store, config);
    let results = engine.search(query).await?;
    render_json(&results, config.pretty_output())
}

fn fail(e: &ProximityError) -> ! {
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
