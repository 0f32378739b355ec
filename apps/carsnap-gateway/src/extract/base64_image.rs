use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use carsnap_domain::upload::UploadError;

/// Standard alphabet, padding optional
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded image bytes plus the MIME type of a `data:` URL prefix, if present
#[derive(Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix
///
/// ASCII whitespace (line wrapping) is ignored.
pub fn decode_base64_image(input: &str) -> Result<DecodedImage, UploadError> {
    let input = input.trim();

    let (mime_type, payload) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| UploadError::transport("Invalid data URL: missing ','"))?;
            let mime = header
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, payload)
        }
        None => (None, input),
    };

    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = LENIENT
        .decode(cleaned.as_bytes())
        .map_err(|err| UploadError::transport(format!("Invalid base64 image data: {}", err)))?;

    Ok(DecodedImage { bytes, mime_type })
}
