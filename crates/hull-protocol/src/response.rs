//! Response descriptors handed back to the host's protocol handler.

use std::path::{Path, PathBuf};

/// Why a request was answered with the fallback document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Nothing exists at the normalized path.
    NotFound,
    /// The path exists but cannot be opened for reading.
    Unreadable,
    /// The candidate path contained characters that cannot name an asset.
    Malformed,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NotFound => "not-found",
            FallbackReason::Unreadable => "unreadable",
            FallbackReason::Malformed => "malformed",
        }
    }
}

/// What the host should answer for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDescriptor {
    /// Serve the requested file directly.
    File {
        path: PathBuf,
        content_type: &'static str,
    },
    /// Serve the application's default entry document.
    Fallback {
        path: PathBuf,
        content_type: &'static str,
        reason: FallbackReason,
    },
    /// Refuse the request (remote URLs while remote access is disabled).
    Forbidden { url: String },
}

impl ResponseDescriptor {
    pub(crate) fn file(path: PathBuf) -> Self {
        let content_type = content_type_for(&path);
        Self::File { path, content_type }
    }

    pub(crate) fn fallback(path: PathBuf, reason: FallbackReason) -> Self {
        let content_type = content_type_for(&path);
        Self::Fallback {
            path,
            content_type,
            reason,
        }
    }

    /// HTTP-style status code for the response.
    pub fn status(&self) -> u16 {
        match self {
            Self::File { .. } | Self::Fallback { .. } => 200,
            Self::Forbidden { .. } => 403,
        }
    }

    /// Path of the file to serve, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } | Self::Fallback { path, .. } => Some(path.as_path()),
            Self::Forbidden { .. } => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::File { content_type, .. } | Self::Fallback { content_type, .. } => *content_type,
            Self::Forbidden { .. } => "text/plain; charset=utf-8",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// `file://` URL for hosts that re-dispatch to their own file loader.
    ///
    /// Forbidden responses have no backing file and yield an empty string.
    pub fn file_url(&self) -> String {
        match self.path() {
            Some(path) => file_url(path),
            None => String::new(),
        }
    }

    /// Read the body of the response.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file vanished between
    /// resolution and reading.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            Self::File { path, .. } | Self::Fallback { path, .. } => tokio::fs::read(path).await,
            Self::Forbidden { .. } => Ok(Vec::new()),
        }
    }
}

fn file_url(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{display}")
    } else {
        format!("file:///{display}")
    }
}

/// Determine content type from file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
