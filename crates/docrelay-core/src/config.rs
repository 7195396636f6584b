//! Process configuration.
//!
//! Environment-driven settings for the service binary. The coordinator
//! itself never reads process-wide state; the binary turns this config into
//! an explicit per-invocation `IngestConfig` so tests can override every
//! knob without shared state.

use std::env;

use anyhow::{bail, Context, Result};

use crate::backend::{QueueBackendKind, StorageBackendKind};

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_DOCUMENT_SIZE_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_MAX_UPLOAD_ATTEMPTS: u32 = 3;
const DEFAULT_MAX_DISPATCH_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 200;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Service configuration loaded from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    // Storage
    pub storage_backend: StorageBackendKind,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    // Queue
    pub queue_backend: QueueBackendKind,
    pub sqs_queue_url: Option<String>,
    pub sqs_region: Option<String>,
    pub sqs_endpoint: Option<String>,
    // Ingestion
    pub max_document_size_bytes: usize,
    pub max_upload_attempts: u32,
    pub max_dispatch_attempts: u32,
    pub retry_backoff_ms: u64,
    pub upload_timeout_secs: u64,
    pub dispatch_timeout_secs: u64,
    // Orphan sweep
    pub sweep_enabled: bool,
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Backend-specific settings are only required when the matching backend
    /// is selected, so a local/memory setup needs no AWS variables at all.
    pub fn from_env() -> Result<Self> {
        let storage_backend: StorageBackendKind = env_or("STORAGE_BACKEND", "s3")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let queue_backend: QueueBackendKind = env_or("QUEUE_BACKEND", "sqs")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let config = Self {
            server_port: parse_env("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env_or("ENVIRONMENT", "development"),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            queue_backend,
            sqs_queue_url: env_opt("SQS_QUEUE_URL"),
            sqs_region: env_opt("SQS_REGION").or_else(|| env_opt("AWS_REGION")),
            sqs_endpoint: env_opt("SQS_ENDPOINT"),
            max_document_size_bytes: parse_env(
                "MAX_DOCUMENT_SIZE_BYTES",
                DEFAULT_MAX_DOCUMENT_SIZE_BYTES,
            )?,
            max_upload_attempts: parse_env("MAX_UPLOAD_ATTEMPTS", DEFAULT_MAX_UPLOAD_ATTEMPTS)?,
            max_dispatch_attempts: parse_env(
                "MAX_DISPATCH_ATTEMPTS",
                DEFAULT_MAX_DISPATCH_ATTEMPTS,
            )?,
            retry_backoff_ms: parse_env("RETRY_BACKOFF_MS", DEFAULT_RETRY_BACKOFF_MS)?,
            upload_timeout_secs: parse_env("UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?,
            dispatch_timeout_secs: parse_env(
                "DISPATCH_TIMEOUT_SECS",
                DEFAULT_DISPATCH_TIMEOUT_SECS,
            )?,
            sweep_enabled: parse_env("SWEEP_ENABLED", true)?,
            sweep_interval_secs: parse_env("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage_backend == StorageBackendKind::S3 && self.s3_bucket.is_none() {
            bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
        }
        if self.storage_backend == StorageBackendKind::Local && self.local_storage_path.is_none() {
            bail!("LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND=local");
        }
        if self.queue_backend == QueueBackendKind::Sqs && self.sqs_queue_url.is_none() {
            bail!("SQS_QUEUE_URL must be set when QUEUE_BACKEND=sqs");
        }
        if self.max_upload_attempts == 0 || self.max_dispatch_attempts == 0 {
            bail!("retry attempt counts must be at least 1");
        }
        Ok(())
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {}", key)),
        None => Ok(default),
    }
}
