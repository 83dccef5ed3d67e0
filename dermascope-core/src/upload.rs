use async_trait::async_trait;
use tracing::debug;

use crate::error::ApiResult;

/// Image bytes ready to be sent as the multipart `file` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Anything the user can pick that can later be read into an [`ImageUpload`].
///
/// In the browser this wraps a `File`; reading it is asynchronous.
#[async_trait(?Send)]
pub trait UploadSource: Clone {
    fn file_name(&self) -> String;
    async fn read_upload(&self) -> ApiResult<ImageUpload>;
}

#[async_trait(?Send)]
impl UploadSource for ImageUpload {
    fn file_name(&self) -> String {
        self.file_name.clone()
    }

    async fn read_upload(&self) -> ApiResult<ImageUpload> {
        Ok(self.clone())
    }
}

/// Creates and releases previewable references (object URLs) for files
pub trait PreviewUrls<F> {
    fn create(&self, file: &F) -> Option<String>;
    fn revoke(&self, url: &str);
}

/// The currently selected file and its single live preview reference
#[derive(Debug, Clone)]
pub struct UploadSelection<F> {
    file: Option<F>,
    preview_url: Option<String>,
}

impl<F> Default for UploadSelection<F> {
    fn default() -> Self {
        Self {
            file: None,
            preview_url: None,
        }
    }
}

impl<F> UploadSelection<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&F> {
        self.file.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Store `file` and derive a fresh preview.
    ///
    /// The previous preview is released before the new one is created, so at
    /// most one reference is ever live.
    pub fn select(&mut self, file: F, previews: &impl PreviewUrls<F>) {
        self.release(previews);
        self.preview_url = previews.create(&file);
        self.file = Some(file);
    }

    /// Release the preview and forget the file.
    pub fn clear(&mut self, previews: &impl PreviewUrls<F>) {
        self.release(previews);
        self.file = None;
    }

    fn release(&mut self, previews: &impl PreviewUrls<F>) {
        if let Some(url) = self.preview_url.take() {
            debug!("Revoking preview {}", url);
            previews.revoke(&url);
        }
    }
}
