//! Writes uploaded recipe images into the public uploads directory.
//!
//! Stored names are `<unix-millis>-<content hash>-<original name>`. The hash keeps two
//! uploads in the same millisecond apart unless their bytes are identical. Only image
//! extensions are accepted, since the directory is served from the blog's own origin.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::AppError;

const HASH_PREFIX_BYTES: usize = 6;
const FALLBACK_NAME: &str = "upload";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the uploads directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Upload(format!("cannot create {}: {e}", self.dir.display()))
        })
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Write `bytes` under a freshly derived name and return that name.
    ///
    /// The write completes (or fails) before this returns.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0))
            .as_millis();
        let filename = stored_name(millis, original_name, bytes);
        let path = self.path_of(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Upload(format!("cannot write {}: {e}", path.display())))?;

        info!(filename = %filename, size = bytes.len(), "image uploaded");
        Ok(filename)
    }

    /// Best-effort removal of a previously saved upload.
    pub async fn remove(&self, filename: &str) {
        let path = self.path_of(filename);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(error = %e, path = %path.display(), "failed to remove orphaned upload");
        }
    }
}

fn stored_name(millis: u128, original_name: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!(
        "{millis}-{}-{}",
        hex_lower(&digest[..HASH_PREFIX_BYTES]),
        sanitize_filename(original_name)
    )
}

/// Whether `name` ends in an extension served as a passive image. SVG is excluded.
pub fn is_image_filename(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

/// Keep the final path component and replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
