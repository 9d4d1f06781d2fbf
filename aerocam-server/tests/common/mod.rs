use std::{fs, path::PathBuf, sync::Arc};

use aerocam_core::{
    Convention, FixedClock, GalleryAssembler, GalleryOptions, GalleryService, MetadataExtractor,
    NamingOptions, PhotoDirectory, PhotoInbox, UploadPolicy,
};
use aerocam_server::{AppState, create_app};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono_tz::Asia::Jakarta;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_TOKEN: &str = "test-upload-token";
pub const MAX_UPLOAD_BYTES: u64 = 1024;
/// 2025-01-01 03:00:00.042 UTC, 10:00 in Jakarta.
pub const NOW_MILLIS: i64 = 1_735_700_400_042;
pub const BOUNDARY: &str = "aerocam-test-boundary";

/// Smallest byte run the upload sniffer accepts as a JPEG.
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

// Code is used by test modules, but not in this scope
#[allow(unused)]
#[derive(Debug)]
pub struct TestApp {
    pub router: Router,
    pub photo_dir: PathBuf,
    _temp: TempDir,
}

#[allow(unused)]
impl TestApp {
    /// App over an existing, empty photo folder.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// App whose photo folder has not been created yet.
    pub fn without_folder() -> Self {
        Self::build(false)
    }

    fn build(create_folder: bool) -> Self {
        let temp = TempDir::new().expect("tempdir");
        let photo_dir = temp.path().join("foto");
        if create_folder {
            fs::create_dir_all(&photo_dir).expect("create photo dir");
        }

        let naming = NamingOptions::default()
            .with_timezone(Jakarta)
            .with_conventions(vec![Convention::NumericId, Convention::FreeFormTitle]);
        let extractor = MetadataExtractor::new(naming).expect("extractor");
        let gallery = GalleryService::new(
            PhotoDirectory::new(photo_dir.clone()),
            GalleryAssembler::new(extractor, GalleryOptions::default()),
        );
        let clock = FixedClock::from_unix_millis(NOW_MILLIS).expect("clock");
        let inbox = PhotoInbox::new(
            photo_dir.clone(),
            UploadPolicy::new(TEST_TOKEN).with_max_bytes(MAX_UPLOAD_BYTES),
            Jakarta,
            Arc::new(clock),
        );

        let state = AppState::new(gallery, inbox, "/foto");
        Self {
            router: create_app(state),
            photo_dir,
            _temp: temp,
        }
    }

    pub fn with_router(mut self, wrap: impl FnOnce(Router) -> Router) -> Self {
        self.router = wrap(self.router);
        self
    }

    pub fn write_photo(&self, filename: &str, bytes: &[u8]) {
        fs::write(self.photo_dir.join(filename), bytes).expect("write photo");
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, body.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    pub async fn upload(&self, uri: &str, form: MultipartForm) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(form.finish()))
            .expect("request");
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

#[allow(unused)]
impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, client_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        let head = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{client_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        );
        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A JPEG of exactly `len` bytes.
#[allow(unused)]
pub fn jpeg_of_len(len: usize) -> Vec<u8> {
    let mut bytes = JPEG_BYTES.to_vec();
    bytes.resize(len.max(JPEG_BYTES.len()), 0);
    bytes
}
