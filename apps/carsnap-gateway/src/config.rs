//! Gateway configuration from the environment
//!
//! Values come from process environment variables (optionally seeded from a
//! `.env` file by `dotenvy`). `from_lookup` takes any key → value function so
//! tests never have to mutate the real environment.

use std::path::PathBuf;
use std::str::FromStr;

use carsnap_domain::upload::UploadConfig;
use thiserror::Error;

/// Configuration errors raised at startup
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when {reason}")]
    Missing { var: &'static str, reason: &'static str },

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which blob store backs the photo container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackendKind {
    /// A named folder on local disk, served by the gateway under `/files`
    Folder,
    /// An S3-compatible bucket
    S3,
}

impl FromStr for BlobBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "folder" => Ok(Self::Folder),
            "s3" => Ok(Self::S3),
            _ => Err("expected 'folder' or 's3'".to_string()),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err("expected 'pretty' or 'json'".to_string()),
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub blob_backend: BlobBackendKind,
    /// Name of the photo container (folder)
    pub folder_name: String,
    /// Folder backend root directory, served at `/files`
    pub storage_root: PathBuf,
    /// Folder backend URL prefix
    pub public_base_url: String,
    pub bucket: String,
    /// S3 public URL template, `{bucket}` and `{key}` placeholders allowed
    pub s3_public_url: Option<String>,
    pub s3_public_acl: bool,
    pub sheet_name: String,
    /// Directory holding `<sheet_name>.csv`
    pub sheets_dir: PathBuf,
    pub max_image_bytes: usize,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let port: u16 = parse(&get, "CARSNAP_PORT", 3000)?;
        let blob_backend = parse(&get, "CARSNAP_BLOB_BACKEND", BlobBackendKind::Folder)?;
        let s3_public_url = get("CARSNAP_S3_PUBLIC_URL");

        if blob_backend == BlobBackendKind::S3 && s3_public_url.is_none() {
            return Err(ConfigError::Missing {
                var: "CARSNAP_S3_PUBLIC_URL",
                reason: "CARSNAP_BLOB_BACKEND=s3",
            });
        }

        Ok(Self {
            host: or("CARSNAP_HOST", "0.0.0.0"),
            port,
            blob_backend,
            folder_name: or("CARSNAP_FOLDER_NAME", "My Cars Photos"),
            storage_root: PathBuf::from(or("CARSNAP_STORAGE_ROOT", "./data/files")),
            public_base_url: get("CARSNAP_PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/files", port)),
            bucket: or("CARSNAP_BUCKET", "car-photos"),
            s3_public_url,
            s3_public_acl: parse_bool(&get, "CARSNAP_S3_PUBLIC_ACL", true)?,
            sheet_name: or("CARSNAP_SHEET_NAME", "Cars"),
            sheets_dir: PathBuf::from(or("CARSNAP_SHEETS_DIR", "./data/sheets")),
            max_image_bytes: parse(
                &get,
                "CARSNAP_MAX_IMAGE_BYTES",
                UploadConfig::default().max_image_bytes,
            )?,
            log_format: parse(&get, "CARSNAP_LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the upload service
    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            max_image_bytes: self.max_image_bytes,
            ..UploadConfig::default()
        }
    }

    /// Request body limit for an image of `max_image_bytes`
    ///
    /// Base64 inflates by 4/3 and URL-encoding can triple every base64 character
    /// (`+`, `/`, `=`), plus room for the other fields.
    pub fn max_body_bytes(&self) -> usize {
        self.max_image_bytes.div_ceil(3) * 4 * 3 + 64 * 1024
    }
}

fn parse<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            value,
            reason: err.to_string(),
        }),
    }
}

fn parse_bool<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(value) => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.blob_backend, BlobBackendKind::Folder);
        assert_eq!(config.folder_name, "My Cars Photos");
        assert_eq!(config.sheet_name, "Cars");
        assert_eq!(config.public_base_url, "http://localhost:3000/files");
        assert!(config.s3_public_acl);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("CARSNAP_PORT", "8080"),
            ("CARSNAP_SHEET_NAME", "Trucks"),
            ("CARSNAP_LOG_FORMAT", "JSON"),
            ("CARSNAP_S3_PUBLIC_ACL", "off"),
            ("CARSNAP_MAX_IMAGE_BYTES", "3000"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.public_base_url, "http://localhost:8080/files");
        assert_eq!(config.sheet_name, "Trucks");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.s3_public_acl);
        assert_eq!(config.upload_config().max_image_bytes, 3000);
        assert_eq!(config.max_body_bytes(), 1000 * 4 * 3 + 64 * 1024);
    }

    #[test]
    fn test_s3_backend_requires_public_url() {
        let err = config(&[("CARSNAP_BLOB_BACKEND", "s3")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                var: "CARSNAP_S3_PUBLIC_URL",
                ..
            }
        ));

        let config = config(&[
            ("CARSNAP_BLOB_BACKEND", "s3"),
            ("CARSNAP_S3_PUBLIC_URL", "https://pub-1234.r2.dev"),
        ])
        .unwrap();
        assert_eq!(config.blob_backend, BlobBackendKind::S3);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config(&[("CARSNAP_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("CARSNAP_PORT"));

        let err = config(&[("CARSNAP_BLOB_BACKEND", "gcs")]).unwrap_err();
        assert!(err.to_string().contains("expected 'folder' or 's3'"));
    }
}
