//! MIME type detection based on file extensions.

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const EXTENSIONS: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("txt", "text/plain; charset=utf-8"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("xml", "text/xml"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("ps", "application/postscript"),
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("bmp", "image/bmp"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/x-wav"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("avi", "video/x-msvideo"),
];

/// Resolves the content type of `path` from the text after the last `.` of
/// its final component, compared case-insensitively.
///
/// # Example
///
/// ```
/// # use relic::http::mime::mime_for_path;
/// assert_eq!(mime_for_path("docs/INDEX.HTML"), "text/html; charset=utf-8");
/// assert_eq!(mime_for_path("Makefile"), "application/octet-stream");
/// ```
pub fn mime_for_path(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);

    let Some((_, extension)) = name.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };

    let extension = extension.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_in_directory_does_not_count() {
        assert_eq!(mime_for_path("v1.2/README"), DEFAULT_MIME_TYPE);
    }

    #[test]
    fn unknown_extension_falls_back() {
        assert_eq!(mime_for_path("archive.xyz"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_for_path("photo.PNG"), "image/png");
    }
}
