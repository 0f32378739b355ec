//! Stored file naming and MIME resolution
//!
//! Stored names are `{epoch_ms}_{stem}.{ext}`. The timestamp keeps names from
//! colliding across time; within one millisecond, distinct stems keep them apart.

/// Content type assumed when neither the client nor sniffing can tell
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Extension used when nothing better can be derived
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Extensions accepted from a client file name
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "heic", "heif", "avif", "tif", "tiff",
];

/// Identify common image formats by their magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        _ => None,
    }
}

/// Resolve the content type to store the blob with
///
/// Declared type first (lower-cased, parameters dropped), then sniffed, then JPEG.
/// A generic `application/octet-stream` declaration counts as undeclared.
pub fn effective_mime(declared: Option<&str>, bytes: &[u8]) -> String {
    declared
        .and_then(|mime| mime.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .filter(|mime| !mime.is_empty() && mime != "application/octet-stream")
        .or_else(|| sniff_mime(bytes).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

/// Map an image content type to its file extension
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" | "image/x-ms-bmp" => Some("bmp"),
        "image/heic" => Some("heic"),
        "image/heif" => Some("heif"),
        "image/avif" => Some("avif"),
        "image/tiff" => Some("tiff"),
        _ => None,
    }
}

/// The suffix of `name`, lower-cased, when it is a recognized image extension
pub fn extension_from_name(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.trim().to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Make a client string safe to use as a file name stem
///
/// Whitespace runs become a single `_`; path separators and control characters
/// are dropped; leading and trailing `_` and `.` are trimmed.
pub fn sanitize_stem(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c == '/' || c == '\\' || c.is_control() {
            continue;
        }
        out.push(c);
    }

    out.trim_matches(|c| c == '_' || c == '.').to_string()
}

/// Build the collision-resistant stored file name
///
/// The stem comes from `name_en`, falling back to the stem of `original_name`.
/// The extension comes from `mime`, then from `original_name`, then defaults to `jpg`.
pub fn build_file_name(
    timestamp_ms: i64,
    name_en: Option<&str>,
    original_name: Option<&str>,
    mime: &str,
) -> String {
    let stem = name_en
        .map(sanitize_stem)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            original_name
                .map(|name| name.rsplit_once('.').map_or(name, |(stem, _)| stem))
                .map(sanitize_stem)
                .filter(|s| !s.is_empty())
        });

    let ext = extension_for_mime(mime)
        .map(str::to_string)
        .or_else(|| original_name.and_then(extension_from_name))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    match stem {
        Some(stem) => format!("{}_{}.{}", timestamp_ms, stem, ext),
        None => format!("{}.{}", timestamp_ms, ext),
    }
}
