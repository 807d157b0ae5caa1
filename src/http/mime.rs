//! MIME type detection module
//!
//! Guesses a media Content-Type from a file extension, used when a source
//! does not declare one itself.

use std::path::Path;

/// Fallback when nothing better is known
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use kiach::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(Some("MKV")), "video/x-matroska");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return OCTET_STREAM;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Video
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "ogv" | "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "ts" | "m2ts" => "video/mp2t",
        "m3u8" => "application/vnd.apple.mpegurl",

        // Audio
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "flac" => "audio/flac",

        // Page assets
        "html" | "htm" => "text/html; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",

        _ => OCTET_STREAM,
    }
}

/// Content-Type for a filesystem path or URL path
pub fn content_type_for_path(path: &str) -> &'static str {
    get_content_type(Path::new(path).extension().and_then(|e| e.to_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_types() {
        assert_eq!(get_content_type(Some("mp4")), "video/mp4");
        assert_eq!(get_content_type(Some("webm")), "video/webm");
        assert_eq!(get_content_type(Some("mov")), "video/quicktime");
        assert_eq!(get_content_type(Some("MP4")), "video/mp4");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), OCTET_STREAM);
        assert_eq!(get_content_type(None), OCTET_STREAM);
    }

    #[test]
    fn test_url_path() {
        assert_eq!(
            content_type_for_path("/video/upload/v1734107266/videos/abc.mp4"),
            "video/mp4"
        );
        assert_eq!(content_type_for_path("/stream"), OCTET_STREAM);
    }
}
