//! DTOs for upload endpoints

use carsnap_domain::upload::{StoredPhoto, UploadError, UploadResult};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// JSON upload body
///
/// Also accepted with a `text/plain` content type, which browser clients use
/// to avoid a CORS preflight.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadJsonRequest {
    /// Base64 image, optionally as a `data:<mime>;base64,` URL
    #[serde(alias = "image", alias = "fileData")]
    #[schema(example = "/9j/4AAQSkZJRgABAQ==")]
    pub photo: Option<String>,
    #[schema(example = "Fire Truck")]
    pub name_en: Option<String>,
    #[schema(example = "Xe cứu hỏa")]
    pub name_vi: Option<String>,
    #[schema(example = "red")]
    pub color: Option<String>,
    /// Defaults to "toy"
    #[schema(example = "emergency")]
    pub category: Option<String>,
    /// 1, 2 or 3; defaults to 1. Numbers are accepted as well as strings.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>, example = "2")]
    pub difficulty: Option<String>,
    #[schema(example = "image/jpeg")]
    pub mime_type: Option<String>,
    #[schema(example = "truck.jpg")]
    pub file_name: Option<String>,
}

/// URL-encoded upload form, as posted by the bundled HTML form
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFormRequest {
    /// Must be "upload" when present
    pub action: Option<String>,
    /// Base64 image
    pub file_data: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub name_en: Option<String>,
    pub name_vi: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
}

/// Upload outcome body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Car added successfully!")]
    pub message: Option<String>,
    /// Public URL of the stored photo
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "http://localhost:3000/files/My%20Cars%20Photos/1700000000123_Fire_Truck.jpg")]
    pub photo_url: Option<String>,
    /// Stored file name (photo-only endpoint)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "1700000000123_truck.jpg")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Missing required fields")]
    pub error: Option<String>,
}

impl UploadResponse {
    /// Body for the photo-only endpoint
    pub fn stored(photo: StoredPhoto) -> Self {
        Self {
            success: true,
            message: None,
            photo_url: Some(photo.url),
            file_name: Some(photo.file_name),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            photo_url: None,
            file_name: None,
            error: Some(message.into()),
        }
    }
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        match result {
            UploadResult::Success {
                message, photo_url, ..
            } => Self {
                success: true,
                message: Some(message),
                photo_url: Some(photo_url),
                file_name: None,
                error: None,
            },
            UploadResult::Failure { error } => Self::error(error),
        }
    }
}

impl From<&UploadError> for UploadResponse {
    fn from(err: &UploadError) -> Self {
        Self::error(err.to_string())
    }
}

/// Liveness probe body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "Car Photo Upload API is running")]
    pub message: String,
}

impl StatusResponse {
    pub fn running() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Car Photo Upload API is running".to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}
