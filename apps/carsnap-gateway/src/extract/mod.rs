//! Transport decoding: HTTP request → `UploadRequest`
//!
//! One upload can arrive three ways, chosen by `Content-Type`:
//! multipart form, URL-encoded form with a base64 field, or a JSON body with a
//! base64 field (any other content type, `text/plain` included).

mod base64_image;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, HeaderMap},
    Form,
};
use bytes::Bytes;
use carsnap_domain::upload::{ImagePayload, UploadError, UploadRequest};
use tracing::debug;

use crate::dto::upload::{UploadFormRequest, UploadJsonRequest};

pub use base64_image::decode_base64_image;

/// Encoding of an upload body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Multipart,
    Form,
    Json,
}

impl BodyKind {
    pub fn of(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            Self::Multipart
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Self::Form
        } else {
            Self::Json
        }
    }
}

/// Decode the request body into an `UploadRequest`
///
/// # Errors
///
/// - `UploadError::Transport` for unreadable bodies, bad JSON or bad base64
/// - `UploadError::Validation("Invalid action")` for a form whose `action` is missing or not `upload`
pub async fn parse_upload(request: Request) -> Result<UploadRequest, UploadError> {
    let kind = BodyKind::of(request.headers());
    debug!(kind = ?kind, "Decoding upload body");

    match kind {
        BodyKind::Multipart => parse_multipart(request).await,
        BodyKind::Form => parse_form(request).await,
        BodyKind::Json => parse_json(request).await,
    }
}

async fn parse_json(request: Request) -> Result<UploadRequest, UploadError> {
    let body = Bytes::from_request(request, &())
        .await
        .map_err(|rejection| UploadError::transport(rejection.body_text()))?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(UploadError::transport("Request body is empty"));
    }

    let payload: UploadJsonRequest = serde_json::from_slice(&body)
        .map_err(|err| UploadError::transport(format!("Invalid JSON body: {}", err)))?;

    Ok(UploadRequest {
        image: image_from_base64(payload.photo, payload.mime_type, payload.file_name)?,
        name_en: payload.name_en,
        name_vi: payload.name_vi,
        color: payload.color,
        category: payload.category,
        difficulty: payload.difficulty,
    })
}

async fn parse_form(request: Request) -> Result<UploadRequest, UploadError> {
    let Form(payload) = Form::<UploadFormRequest>::from_request(request, &())
        .await
        .map_err(|rejection| UploadError::transport(rejection.body_text()))?;

    if payload.action.as_deref() != Some("upload") {
        return Err(UploadError::validation("Invalid action"));
    }

    Ok(UploadRequest {
        image: image_from_base64(payload.file_data, payload.mime_type, payload.file_name)?,
        name_en: payload.name_en,
        name_vi: payload.name_vi,
        color: payload.color,
        category: payload.category,
        difficulty: payload.difficulty,
    })
}

async fn parse_multipart(request: Request) -> Result<UploadRequest, UploadError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| UploadError::transport(rejection.body_text()))?;

    let mut upload = UploadRequest::default();
    let mut photo: Option<ImagePayload> = None;
    let mut mime_type: Option<String> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        UploadError::transport(format!("Failed to parse multipart data: {}", err))
    })? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" || name == "image" {
            let part_file_name = field.file_name().map(str::to_string);
            let part_mime = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|err| {
                UploadError::transport(format!("Failed to read photo: {}", err))
            })?;
            debug!(size = bytes.len(), file_name = ?part_file_name, "Received photo part");

            photo = Some(ImagePayload {
                bytes: bytes.to_vec(),
                mime_type: part_mime,
                file_name: part_file_name,
            });
            continue;
        }

        let value = field.text().await.map_err(|err| {
            UploadError::transport(format!("Failed to read field '{}': {}", name, err))
        })?;
        match name.as_str() {
            "nameEn" => upload.name_en = Some(value),
            "nameVi" => upload.name_vi = Some(value),
            "color" => upload.color = Some(value),
            "category" => upload.category = Some(value),
            "difficulty" => upload.difficulty = Some(value),
            "mimeType" => mime_type = Some(value),
            "fileName" => file_name = Some(value),
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    // Explicit text fields override what the file part declared
    upload.image = photo.map(|mut image| {
        image.mime_type = mime_type.or(image.mime_type);
        image.file_name = file_name.or(image.file_name);
        image
    });
    Ok(upload)
}

/// An absent or empty base64 field means "no image", not a decode error
fn image_from_base64(
    data: Option<String>,
    mime_type: Option<String>,
    file_name: Option<String>,
) -> Result<Option<ImagePayload>, UploadError> {
    let Some(data) = data.filter(|d| !d.trim().is_empty()) else {
        return Ok(None);
    };

    let decoded = decode_base64_image(&data)?;
    Ok(Some(ImagePayload {
        bytes: decoded.bytes,
        mime_type: mime_type
            .filter(|m| !m.trim().is_empty())
            .or(decoded.mime_type),
        file_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::HeaderValue;

    fn request(content_type: &str, body: impl Into<Body>) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .unwrap()
    }

    #[test]
    fn test_body_kind_detection() {
        let mut headers = HeaderMap::new();
        assert_eq!(BodyKind::of(&headers), BodyKind::Json);

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=x"),
        );
        assert_eq!(BodyKind::of(&headers), BodyKind::Multipart);

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        assert_eq!(BodyKind::of(&headers), BodyKind::Form);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain;charset=utf-8"));
        assert_eq!(BodyKind::of(&headers), BodyKind::Json);
    }

    #[tokio::test]
    async fn test_parse_json_with_data_url() {
        let body = r#"{"photo":"data:image/png;base64,iVBORw0KGgo=","nameEn":"Bus","nameVi":"Xe buýt","color":"yellow"}"#;

        let upload = parse_upload(request("text/plain", body)).await.unwrap();

        let image = upload.image.unwrap();
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(image.mime_type.as_deref(), Some("image/png"));
        assert_eq!(upload.name_vi.as_deref(), Some("Xe buýt"));
    }

    #[tokio::test]
    async fn test_parse_json_rejects_garbage() {
        let err = parse_upload(request("application/json", "{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Transport(_)));

        let err = parse_upload(request("application/json", ""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request body is empty");
    }

    #[tokio::test]
    async fn test_parse_json_empty_photo_is_missing() {
        let upload = parse_upload(request("application/json", r#"{"photo":"","nameEn":"A"}"#))
            .await
            .unwrap();
        assert!(upload.image.is_none());
    }

    #[tokio::test]
    async fn test_parse_form_requires_upload_action() {
        let err = parse_upload(request(
            "application/x-www-form-urlencoded",
            "action=delete&nameEn=Bus",
        ))
        .await
        .unwrap_err();
        assert_eq!(err, UploadError::validation("Invalid action"));

        let err = parse_upload(request(
            "application/x-www-form-urlencoded",
            "fileData=%2F9j%2F2Q%3D%3D&nameEn=Bus&nameVi=Xe&color=red",
        ))
        .await
        .unwrap_err();
        assert_eq!(err, UploadError::validation("Invalid action"));
    }

    #[tokio::test]
    async fn test_parse_form_decodes_file_data() {
        let upload = parse_upload(request(
            "application/x-www-form-urlencoded",
            "action=upload&fileData=%2F9j%2F2Q%3D%3D&fileName=bus.jpg&mimeType=image%2Fjpeg&nameEn=Bus",
        ))
        .await
        .unwrap();

        let image = upload.image.unwrap();
        assert_eq!(image.bytes, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(image.file_name.as_deref(), Some("bus.jpg"));
        assert_eq!(image.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(upload.name_en.as_deref(), Some("Bus"));
    }

    #[tokio::test]
    async fn test_parse_multipart_fields() {
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"nameEn\"\r\n\r\n\
            Taxi\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"photo\"; filename=\"taxi.gif\"\r\n\
            Content-Type: image/gif\r\n\r\n\
            GIF89a\r\n\
            --XYZ--\r\n";

        let upload = parse_upload(request("multipart/form-data; boundary=XYZ", body))
            .await
            .unwrap();

        let image = upload.image.unwrap();
        assert_eq!(image.bytes, b"GIF89a".to_vec());
        assert_eq!(image.mime_type.as_deref(), Some("image/gif"));
        assert_eq!(image.file_name.as_deref(), Some("taxi.gif"));
        assert_eq!(upload.name_en.as_deref(), Some("Taxi"));
    }
}
