//! carsnap gateway - car photo upload service
//!
//! Stores uploaded photos in a folder or S3 bucket and appends one row per
//! photo to the cars sheet.

use anyhow::{Context, Result};
use carsnap_domain::upload::UploadService;
use carsnap_gateway::{
    backend::BlobBackend,
    config::{BlobBackendKind, GatewayConfig, LogFormat},
    routes::{self, RouterOptions},
    AppState,
};
use carsnap_local::{CsvSheetSink, FolderBlobStore};
use carsnap_s3::{S3BlobStore, S3BlobStoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env().context("Invalid configuration")?;

    init_tracing(config.log_format);

    info!("Starting carsnap gateway");

    let blob_store = build_blob_store(&config).await?;

    let record_sink = CsvSheetSink::new(&config.sheets_dir, config.sheet_name.clone());
    if !record_sink.path().exists() {
        warn!(
            path = %record_sink.path().display(),
            "Sheet file does not exist; uploads will fail until it is created"
        );
    }

    let options = RouterOptions {
        files_dir: blob_store.served_dir().map(|dir| dir.to_path_buf()),
        max_body_bytes: config.max_body_bytes(),
    };

    // Create upload service and shared application state
    let service = UploadService::new(blob_store, record_sink, config.upload_config());
    let state = AppState::new(service);

    // Build HTTP router
    let app = routes::create_router(state, options);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn build_blob_store(config: &GatewayConfig) -> Result<BlobBackend> {
    match config.blob_backend {
        BlobBackendKind::Folder => {
            info!(root = %config.storage_root.display(), "Using folder blob store");
            Ok(BlobBackend::Folder(FolderBlobStore::new(
                &config.storage_root,
                config.folder_name.clone(),
                config.public_base_url.clone(),
            )))
        }
        BlobBackendKind::S3 => {
            info!(bucket = %config.bucket, "Using S3 blob store");

            // Region, credentials and endpoint come from the standard AWS environment
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

            // Path-style addressing for MinIO / R2 compatibility
            let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(true)
                .build();
            let client = aws_sdk_s3::Client::from_conf(s3_config);

            let public_url = config
                .s3_public_url
                .clone()
                .context("CARSNAP_S3_PUBLIC_URL is required for the s3 backend")?;
            let store_config = S3BlobStoreConfig::new(config.bucket.clone(), public_url)?
                .with_public_acl(config.s3_public_acl);

            Ok(BlobBackend::S3(S3BlobStore::new(client, store_config)))
        }
    }
}
