use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use poi_proximity::utils::{logger, validation::Validate};
use poi_proximity::{
    AnnotatedRecord, DatasetPointStore, LambdaConfig, ProximityQuery, ProximitySearch, S3Storage,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Request {
    pub latitude: f64,
    pub longitude: f64,
    pub miles: f64,
}

#[derive(Serialize)]
pub struct Response {
    pub count: usize,
    pub results: Vec<AnnotatedRecord>,
}

async fn function_handler(
    event: LambdaEvent<Request>,
    engine: &ProximitySearch<DatasetPointStore<S3Storage>>,
) -> Result<Response, Error> {
    let request = event.payload;
    tracing::info!(
        "Proximity search: {} miles around ({}, {})",
        request.miles,
        request.latitude,
        request.longitude
    );

    let query = ProximityQuery::new(request.latitude, request.longitude, request.miles);
    let results = engine.search(&query).await.map_err(|e| {
        tracing::error!(
            "Proximity search failed: {} (Category: {:?})",
            e,
            e.category()
        );
        Box::new(e) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Response {
        count: results.len(),
        results,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(lambda_config.s3_region.clone()))
        .build();
    let s3_client = S3Client::from_conf(config);

    let storage = S3Storage::new(s3_client, lambda_config.s3_bucket.clone());
    let store = DatasetPointStore::new(storage, lambda_config.dataset_key.clone())?;
    let engine = ProximitySearch::from_config(store, &lambda_config);
    let engine = &engine;

    run(service_fn(move |event| function_handler(event, engine))).await
}
