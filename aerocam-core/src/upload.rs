//! Upload intake for capture clients.
//!
//! Validation order is fixed: token, file present, MIME type, size, then
//! filename. The MIME type is sniffed from the file content. Accepted files
//! are written to a temporary file inside the photo folder and renamed into
//! place, so listings never see partial uploads.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono_tz::Tz;
use constant_time_eq::constant_time_eq;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::scanner::DEFAULT_IMAGE_EXTENSIONS;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_ALLOWED_MIME: [&str; 2] = ["image/jpeg", "image/png"];

/// Why an upload was refused. The display strings are the client-facing
/// messages.
#[derive(Error, Debug)]
pub enum UploadRejection {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid file")]
    InvalidType {
        detected: Option<&'static str>,
        declared: Option<String>,
    },

    #[error("File too large")]
    TooLarge { size: u64, limit: u64 },

    #[error("Invalid filename")]
    InvalidFilename,

    #[error("Failed to save")]
    Storage(#[source] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub token: String,
    pub max_bytes: u64,
    pub allowed_mime: Vec<String>,
}

impl UploadPolicy {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_mime: DEFAULT_ALLOWED_MIME.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_allowed_mime(mut self, allowed: Vec<String>) -> Self {
        self.allowed_mime = allowed;
        self
    }

    /// Constant-time comparison against the shared secret.
    pub fn authorize(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(token) => constant_time_eq(token.as_bytes(), self.token.as_bytes()),
            None => false,
        }
    }

    /// MIME check, ignoring case and any parameters (`; charset=...`).
    pub fn accepts_mime(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.allowed_mime
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
    }
}

/// Sniff an image type from its leading bytes.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        _ if bytes.starts_with(PNG) => Some("image/png"),
        _ if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") => {
            Some("image/gif")
        }
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
            Some("image/webp")
        }
        _ => None,
    }
}

/// File part of an upload.
///
/// `size` counts every byte the client sent, even when `bytes` was dropped
/// after the limit was exceeded. `detected_type` comes from the content, not
/// from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub declared_type: Option<String>,
    pub detected_type: Option<&'static str>,
    pub bytes: Vec<u8>,
    pub size: u64,
}

impl UploadedFile {
    pub fn new(declared_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            declared_type,
            detected_type: detect_image_mime(&bytes),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Collects a streamed file part, keeping at most `limit` bytes.
#[derive(Debug)]
pub struct UploadBuffer {
    limit: u64,
    head: Vec<u8>,
    bytes: Vec<u8>,
    size: u64,
}

impl UploadBuffer {
    const SNIFF_LEN: usize = 16;

    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            head: Vec::with_capacity(Self::SNIFF_LEN),
            bytes: Vec::new(),
            size: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        if self.head.len() < Self::SNIFF_LEN {
            let take = (Self::SNIFF_LEN - self.head.len()).min(chunk.len());
            self.head.extend_from_slice(&chunk[..take]);
        }

        self.size = self.size.saturating_add(chunk.len() as u64);
        if self.size <= self.limit {
            self.bytes.extend_from_slice(chunk);
        } else if !self.bytes.is_empty() {
            self.bytes = Vec::new();
        }
    }

    pub fn is_over_limit(&self) -> bool {
        self.size > self.limit
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn finish(self, declared_type: Option<String>) -> UploadedFile {
        UploadedFile {
            declared_type,
            detected_type: detect_image_mime(&self.head),
            bytes: self.bytes,
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSubmission {
    pub token: Option<String>,
    pub filename: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Whether the photo folder scan would list a file stored as `name`: not
/// hidden, and carrying an image extension.
fn is_listable_name(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DEFAULT_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Writes accepted uploads into the photo folder.
#[derive(Debug, Clone)]
pub struct PhotoInbox {
    dir: PathBuf,
    policy: UploadPolicy,
    timezone: Tz,
    clock: Arc<dyn Clock>,
}

impl PhotoInbox {
    pub fn new(
        dir: impl Into<PathBuf>,
        policy: UploadPolicy,
        timezone: Tz,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dir: dir.into(),
            policy,
            timezone,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Everything short of touching the disk.
    pub fn validate(&self, submission: &UploadSubmission) -> Result<(), UploadRejection> {
        if !self.policy.authorize(submission.token.as_deref()) {
            return Err(UploadRejection::Unauthorized);
        }

        let file = submission.file.as_ref().ok_or(UploadRejection::MissingFile)?;

        if !self.policy.accepts_mime(file.detected_type) {
            return Err(UploadRejection::InvalidType {
                detected: file.detected_type,
                declared: file.declared_type.clone(),
            });
        }

        if file.size > self.policy.max_bytes {
            return Err(UploadRejection::TooLarge {
                size: file.size,
                limit: self.policy.max_bytes,
            });
        }

        Ok(())
    }

    /// Validate and store one upload. Blocking.
    pub fn accept(&self, submission: UploadSubmission) -> Result<StoredUpload, UploadRejection> {
        if let Err(rejection) = self.validate(&submission) {
            warn!("Upload rejected: {}", rejection);
            return Err(rejection);
        }

        let UploadSubmission { filename, file, .. } = submission;
        let file = file.ok_or(UploadRejection::MissingFile)?;
        let filename = self.target_filename(filename.as_deref()).inspect_err(|rejection| {
            warn!("Upload rejected: {}", rejection);
        })?;

        let path = self.store(&filename, &file.bytes).map_err(|e| {
            error!("Failed to store upload {} in {}: {}", filename, self.dir.display(), e);
            UploadRejection::Storage(e)
        })?;

        info!("Stored upload {} ({} bytes)", filename, file.size);
        Ok(StoredUpload {
            filename,
            path,
            size: file.size,
        })
    }

    /// Sanitized client name, or a timestamped fallback when none was sent.
    pub fn target_filename(&self, requested: Option<&str>) -> Result<String, UploadRejection> {
        match requested.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => {
                let sanitized = sanitize_filename(name);
                if is_listable_name(&sanitized) {
                    Ok(sanitized)
                } else {
                    Err(UploadRejection::InvalidFilename)
                }
            }
            None => Ok(self.fallback_filename()),
        }
    }

    /// `fallback_<YYYY-MM-DD_HH-MM-SS>_<ms>.jpg` in the gallery timezone.
    pub fn fallback_filename(&self) -> String {
        let now = self.clock.now().with_timezone(&self.timezone);
        format!(
            "fallback_{}_{:03}.jpg",
            now.format("%Y-%m-%d_%H-%M-%S"),
            now.timestamp_subsec_millis()
        )
    }

    fn store(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        let target = self.dir.join(filename);
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use tempfile::TempDir;

    const TOKEN: &str = "s3cret";
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn inbox(dir: &Path) -> PhotoInbox {
        PhotoInbox::new(
            dir,
            UploadPolicy::new(TOKEN),
            chrono_tz::Asia::Jakarta,
            Arc::new(FixedClock::from_unix_millis(1_735_700_400_042).unwrap()),
        )
    }

    fn jpeg_bytes(len: usize) -> Vec<u8> {
        let mut bytes = JPEG_MAGIC.to_vec();
        bytes.resize(len.max(JPEG_MAGIC.len()), 0);
        bytes
    }

    fn jpeg(len: usize) -> Option<UploadedFile> {
        Some(UploadedFile::new(Some("image/jpeg".to_string()), jpeg_bytes(len)))
    }

    fn submission(
        token: Option<&str>,
        filename: Option<&str>,
        file: Option<UploadedFile>,
    ) -> UploadSubmission {
        UploadSubmission {
            token: token.map(str::to_string),
            filename: filename.map(str::to_string),
            file,
        }
    }

    #[test]
    fn sanitizes_each_character() {
        assert_eq!(sanitize_filename("pak tommy/../x.jpg"), "pak_tommy_.._x.jpg");
        assert_eq!(sanitize_filename("café.jpg"), "caf_.jpg");
        assert_eq!(
            sanitize_filename("cam_2025-01-01_10-00-00.jpg"),
            "cam_2025-01-01_10-00-00.jpg"
        );
    }

    #[test]
    fn detects_images_from_content() {
        assert_eq!(detect_image_mime(&JPEG_MAGIC), Some("image/jpeg"));
        assert_eq!(
            detect_image_mime(b"\x89PNG\r\n\x1a\n\0\0"),
            Some("image/png")
        );
        assert_eq!(detect_image_mime(b"GIF89a..."), Some("image/gif"));
        assert_eq!(detect_image_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(detect_image_mime(b"<html>"), None);
        assert_eq!(detect_image_mime(b""), None);
    }

    #[test]
    fn declared_type_is_not_trusted() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        let disguised = UploadedFile::new(Some("image/jpeg".into()), b"#!/bin/sh".to_vec());
        assert!(matches!(
            inbox.validate(&submission(Some(TOKEN), None, Some(disguised))),
            Err(UploadRejection::InvalidType { detected: None, .. })
        ));

        let undeclared = UploadedFile::new(None, jpeg_bytes(8));
        assert!(inbox.validate(&submission(Some(TOKEN), None, Some(undeclared))).is_ok());
    }

    #[test]
    fn checks_run_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());

        let text = UploadedFile::new(Some("text/plain".into()), vec![b'a'; 10]);
        assert!(matches!(
            inbox.validate(&submission(Some("wrong"), None, Some(text.clone()))),
            Err(UploadRejection::Unauthorized)
        ));
        assert!(matches!(
            inbox.validate(&submission(None, None, jpeg(8))),
            Err(UploadRejection::Unauthorized)
        ));
        assert!(matches!(
            inbox.validate(&submission(Some(TOKEN), None, None)),
            Err(UploadRejection::MissingFile)
        ));

        let mut huge_text = UploadBuffer::new(DEFAULT_MAX_UPLOAD_BYTES);
        huge_text.push(b"plain text header");
        huge_text.push(&vec![b'a'; DEFAULT_MAX_UPLOAD_BYTES as usize]);
        assert!(matches!(
            inbox.validate(&submission(Some(TOKEN), None, Some(huge_text.finish(None)))),
            Err(UploadRejection::InvalidType { .. })
        ));

        let mut huge_jpeg = UploadBuffer::new(DEFAULT_MAX_UPLOAD_BYTES);
        huge_jpeg.push(&JPEG_MAGIC);
        huge_jpeg.push(&vec![0u8; DEFAULT_MAX_UPLOAD_BYTES as usize]);
        assert!(matches!(
            inbox.validate(&submission(Some(TOKEN), None, Some(huge_jpeg.finish(None)))),
            Err(UploadRejection::TooLarge {
                limit: DEFAULT_MAX_UPLOAD_BYTES,
                ..
            })
        ));
    }

    #[test]
    fn buffer_drops_bytes_past_the_limit_but_keeps_counting() {
        let mut buffer = UploadBuffer::new(6);
        buffer.push(&JPEG_MAGIC);
        buffer.push(&[1, 2]);
        assert!(!buffer.is_over_limit());
        buffer.push(&[3]);
        assert!(buffer.is_over_limit());
        buffer.push(&[4, 5, 6]);

        let file = buffer.finish(Some("image/jpeg".into()));
        assert_eq!(file.size, 10);
        assert!(file.bytes.is_empty());
        assert_eq!(file.detected_type, Some("image/jpeg"));
    }

    #[test]
    fn exact_limit_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = PhotoInbox::new(
            temp_dir.path(),
            UploadPolicy::new(TOKEN).with_max_bytes(8),
            chrono_tz::UTC,
            Arc::new(FixedClock::from_unix_millis(0).unwrap()),
        );
        assert!(inbox.validate(&submission(Some(TOKEN), None, jpeg(8))).is_ok());
        assert!(matches!(
            inbox.validate(&submission(Some(TOKEN), None, jpeg(9))),
            Err(UploadRejection::TooLarge { size: 9, limit: 8 })
        ));
    }

    #[test]
    fn mime_matching_ignores_case_and_parameters() {
        let policy = UploadPolicy::new(TOKEN);
        assert!(policy.accepts_mime(Some("IMAGE/PNG")));
        assert!(policy.accepts_mime(Some("image/jpeg; q=1")));
        assert!(!policy.accepts_mime(Some("image/gif")));
        assert!(!policy.accepts_mime(None));
    }

    #[test]
    fn stores_under_sanitized_name() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        let stored = inbox
            .accept(submission(
                Some(TOKEN),
                Some("pak tommy_2025-01-01_10-00-00.jpg"),
                jpeg(32),
            ))
            .unwrap();
        assert_eq!(stored.filename, "pak_tommy_2025-01-01_10-00-00.jpg");
        assert_eq!(stored.size, 32);
        assert_eq!(fs::read(&stored.path).unwrap(), jpeg_bytes(32));
        // Only the final file remains.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn existing_files_are_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        fs::write(temp_dir.path().join("a.jpg"), b"old").unwrap();
        inbox
            .accept(submission(Some(TOKEN), Some("a.jpg"), jpeg(16)))
            .unwrap();
        assert_eq!(fs::read(temp_dir.path().join("a.jpg")).unwrap(), jpeg_bytes(16));
    }

    #[test]
    fn fallback_name_uses_clock_and_timezone() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        assert_eq!(
            inbox.fallback_filename(),
            "fallback_2025-01-01_10-00-00_042.jpg"
        );
        let stored = inbox
            .accept(submission(Some(TOKEN), Some("   "), jpeg(8)))
            .unwrap();
        assert_eq!(stored.filename, "fallback_2025-01-01_10-00-00_042.jpg");
    }

    #[test]
    fn dot_only_names_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        for name in [".", "..", "..."] {
            assert!(matches!(
                inbox.accept(submission(Some(TOKEN), Some(name), jpeg(8))),
                Err(UploadRejection::InvalidFilename)
            ));
        }
    }

    #[test]
    fn names_the_gallery_would_hide_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let inbox = inbox(temp_dir.path());
        for name in [".jpg", ".hidden.png", "capture", "capture.txt"] {
            assert!(
                matches!(
                    inbox.accept(submission(Some(TOKEN), Some(name), jpeg(8))),
                    Err(UploadRejection::InvalidFilename)
                ),
                "{name}"
            );
        }
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        assert_eq!(inbox.target_filename(Some("CAM 1.JPG")).unwrap(), "CAM_1.JPG");
        assert_eq!(inbox.target_filename(Some("shot.jpeg")).unwrap(), "shot.jpeg");
    }

    #[test]
    fn creates_missing_folder() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("foto");
        let inbox = inbox(&dir);
        inbox
            .accept(submission(Some(TOKEN), Some("a.jpg"), jpeg(8)))
            .unwrap();
        assert!(dir.join("a.jpg").is_file());
    }

    #[test]
    fn storage_failures_are_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("foto");
        fs::write(&blocker, b"not a dir").unwrap();
        let inbox = inbox(&blocker);
        let result = inbox.accept(submission(Some(TOKEN), Some("a.jpg"), jpeg(8)));
        assert!(matches!(result, Err(UploadRejection::Storage(_))));
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(UploadRejection::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(UploadRejection::MissingFile.to_string(), "No file uploaded");
        assert_eq!(
            UploadRejection::TooLarge { size: 2, limit: 1 }.to_string(),
            "File too large"
        );
    }
}
