use crate::config::validate_max_radius;
use crate::core::{SearchConfig, Storage};
use crate::utils::error::{ProximityError, Result};
use crate::utils::validation::{validate_file_extension, validate_non_empty_string, Validate};
use aws_sdk_s3::Client as S3Client;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub dataset_key: String,
    pub s3_region: String,
    pub max_radius_miles: Option<f64>,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let max_radius_miles = match env::var("MAX_RADIUS_MILES") {
            Ok(raw) => Some(raw.parse::<f64>().map_err(|_| {
                ProximityError::InvalidConfigValueError {
                    field: "MAX_RADIUS_MILES".to_string(),
                    value: raw.clone(),
                    reason: "must be a number of miles".to_string(),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            s3_bucket: env::var("PARKS_BUCKET").map_err(|_| ProximityError::MissingConfigError {
                field: "PARKS_BUCKET".to_string(),
            })?,
            dataset_key: env::var("PARKS_KEY").unwrap_or_else(|_| "parks.csv".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            max_radius_miles,
        })
    }
}

impl SearchConfig for LambdaConfig {
    fn max_radius_miles(&self) -> Option<f64> {
        self.max_radius_miles
    }

    fn pretty_output(&self) -> bool {
        false
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        validate_s3_bucket_name("PARKS_BUCKET", &self.s3_bucket)?;
        validate_file_extension("PARKS_KEY", &self.dataset_key, &["csv", "json"])?;
        validate_aws_region("S3_REGION", &self.s3_region)?;
        validate_max_radius("MAX_RADIUS_MILES", self.max_radius_miles)?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let invalid = |reason: &str| ProximityError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: bucket_name.to_string(),
        reason: reason.to_string(),
    };

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid("S3 bucket name must be between 3 and 63 characters"));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid("S3 bucket name cannot start or end with a hyphen"));
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ProximityError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// Dataset bytes from an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                ProximityError::storage(format!(
                    "Failed to read s3://{}/{}: {}",
                    self.bucket, path, e
                ))
            })?;

        let data = resp.body.collect().await.map_err(|e| {
            ProximityError::storage(format!("Failed to collect S3 data: {}", e))
        })?;

        Ok(data.into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_name_rules() {
        assert!(validate_s3_bucket_name("PARKS_BUCKET", "rv-parks.data").is_ok());
        assert!(validate_s3_bucket_name("PARKS_BUCKET", "ab").is_err());
        assert!(validate_s3_bucket_name("PARKS_BUCKET", "RV_Parks").is_err());
        assert!(validate_s3_bucket_name("PARKS_BUCKET", "-parks").is_err());
    }

    #[test]
    fn test_region_rules() {
        assert!(validate_aws_region("S3_REGION", "us-east-1").is_ok());
        assert!(validate_aws_region("S3_REGION", "US East").is_err());
        assert!(validate_aws_region("S3_REGION", " ").is_err());
    }
}
