use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// S3 bucket for resume blobs. `None` selects the local backend.
    pub resume_bucket: Option<String>,
    pub resume_table: String,
    pub local_storage_dir: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Scholarship catalog and resume storage API")]
pub struct Args {
    /// Host to bind to (overrides SCHOLARSHIP_API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SCHOLARSHIP_API_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// S3 bucket for resume blobs (overrides RESUME_BUCKET_NAME)
    #[arg(long)]
    pub resume_bucket: Option<String>,

    /// DynamoDB table for resume metadata (overrides RESUME_TABLE_NAME)
    #[arg(long)]
    pub resume_table: Option<String>,

    /// Directory for the local resume store (overrides RESUME_LOCAL_STORAGE_DIR)
    #[arg(long)]
    pub local_storage_dir: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("SCHOLARSHIP_API_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("SCHOLARSHIP_API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing SCHOLARSHIP_API_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading SCHOLARSHIP_API_PORT"),
        };
        let env_bucket = env::var("RESUME_BUCKET_NAME").ok();
        let env_table = env::var("RESUME_TABLE_NAME").unwrap_or_else(|_| "Resumes".into());
        let env_local_dir =
            env::var("RESUME_LOCAL_STORAGE_DIR").unwrap_or_else(|_| "local_resumes".into());

        // --- Merge ---
        // An empty bucket name counts as unset, so a blank env entry still
        // selects the local backend.
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            resume_bucket: args
                .resume_bucket
                .or(env_bucket)
                .filter(|bucket| !bucket.is_empty()),
            resume_table: args.resume_table.unwrap_or(env_table),
            local_storage_dir: args.local_storage_dir.unwrap_or(env_local_dir),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
