//! Static asset fallback.
//!
//! Serves files verbatim from a root directory for paths no route claimed.
//! `/` and directory paths resolve to the index document. Two checks keep
//! lookups inside the root: `..` components are rejected outright, and the
//! canonicalized file path must still start with the canonicalized root.

use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use tokio::fs;

use crate::response::Response;

/// Static-file handler, served through [`Router::fallback`](crate::Router::fallback).
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use sumi::{Request, Router, StaticFiles};
/// let assets = Arc::new(StaticFiles::new("static"));
/// let app = Router::new().fallback(move |req: Request| {
///     let assets = Arc::clone(&assets);
///     async move { assets.serve(req.path()).await }
/// });
/// ```
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), index: "index.html".to_owned() }
    }

    /// Overrides the index document name (default `index.html`).
    pub fn index(mut self, name: &str) -> Self {
        self.index = name.to_owned();
        self
    }

    /// Resolves a URL path under the root and serves the file's exact bytes,
    /// or an empty 404 when nothing matches.
    pub async fn serve(&self, url_path: &str) -> Response {
        match self.resolve(url_path).await {
            Some(file) => match fs::read(&file).await {
                Ok(content) => {
                    let mime = content_type(file.extension().and_then(|e| e.to_str()));
                    Response::bytes(mime, content)
                }
                Err(_) => Response::status(StatusCode::NOT_FOUND),
            },
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }

    async fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let relative = url_path.trim_start_matches('/');
        if Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        let mut file = self.root.join(relative);
        let is_dir = fs::metadata(&file).await.map(|m| m.is_dir()).unwrap_or(false);
        if relative.is_empty() || url_path.ends_with('/') || is_dir {
            file = file.join(&self.index);
        }

        // Canonicalization fails for missing files, which doubles as the
        // existence check.
        let root = fs::canonicalize(&self.root).await.ok()?;
        let file = fs::canonicalize(&file).await.ok()?;
        file.starts_with(&root).then_some(file)
    }
}

/// Content-Type by file extension; unknown extensions download as bytes.
fn content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh directory under the OS temp dir, torn down on drop.
    struct AssetDir(PathBuf);

    impl AssetDir {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("sumi-{tag}-{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, name: &str, content: &[u8]) {
            std::fs::write(self.0.join(name), content).unwrap();
        }
    }

    impl Drop for AssetDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn serves_exact_bytes_with_detected_mime() {
        let dir = AssetDir::new("bytes");
        dir.write("app.js", b"console.log('hi');");

        let files = StaticFiles::new(&dir.0);
        let res = files.serve("/app.js").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"console.log('hi');");
        assert!(res.headers.iter().any(|(n, v)| n == "content-type" && v == "application/javascript"));
    }

    #[tokio::test]
    async fn root_path_serves_the_index_document() {
        let dir = AssetDir::new("index");
        dir.write("index.html", b"<h1>front</h1>");

        let res = StaticFiles::new(&dir.0).serve("/").await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"<h1>front</h1>");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let dir = AssetDir::new("missing");
        let res = StaticFiles::new(&dir.0).serve("/nonexistent-path").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn parent_dir_traversal_is_rejected() {
        let dir = AssetDir::new("traversal");
        dir.write("inside.txt", b"fine");

        let files = StaticFiles::new(&dir.0);
        let res = files.serve("/../../etc/hostname").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }
}
