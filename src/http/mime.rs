//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension. Also used
//! by `render`, which treats its part kind ("html", "json", ...) as a pseudo
//! extension.

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use crossbar::http::mime::content_type;
/// assert_eq!(content_type("html"), "text/html");
/// assert_eq!(content_type("jpg"), "image/jpeg");
/// assert_eq!(content_type("bin"), "application/octet-stream");
/// ```
pub fn content_type(extension: &str) -> &'static str {
    match extension {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "text" | "md" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Audio/Video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        // Default
        _ => "application/octet-stream",
    }
}

/// Content-Type for a filesystem path, from its extension.
pub fn content_type_of_path(path: &std::path::Path) -> &'static str {
    content_type(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
}
