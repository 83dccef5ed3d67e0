//! Browser-backed implementations of the core traits.

use async_trait::async_trait;
use dermascope_core::error::{ApiError, ApiResult, InputError};
use dermascope_core::session::{SessionKey, SessionStore};
use dermascope_core::upload::{ImageUpload, PreviewUrls, UploadSource};
use js_sys::Uint8Array;
use tracing::warn;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, Storage, Url};

/// Session state kept in Web Storage.
///
/// Credentials go to `localStorage`; the last prediction goes to
/// `sessionStorage` and disappears with the tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSession;

impl BrowserSession {
    fn storage(key: SessionKey) -> Option<Storage> {
        let window = web_sys::window()?;
        let storage = if key.is_persistent() {
            window.local_storage()
        } else {
            window.session_storage()
        };
        storage.ok().flatten()
    }
}

impl SessionStore for BrowserSession {
    fn get(&self, key: SessionKey) -> Option<String> {
        Self::storage(key)?.get_item(key.as_str()).ok().flatten()
    }

    fn set(&self, key: SessionKey, value: &str) {
        match Self::storage(key) {
            Some(storage) => {
                if storage.set_item(key.as_str(), value).is_err() {
                    warn!("Failed to write {} to storage", key.as_str());
                }
            }
            None => warn!("Web storage unavailable, {} not saved", key.as_str()),
        }
    }

    fn remove(&self, key: SessionKey) {
        if let Some(storage) = Self::storage(key) {
            let _ = storage.remove_item(key.as_str());
        }
    }
}

/// Object URLs for local file previews
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectUrls;

impl PreviewUrls<BrowserFile> for ObjectUrls {
    fn create(&self, file: &BrowserFile) -> Option<String> {
        match Url::create_object_url_with_blob(&file.0) {
            Ok(url) => Some(url),
            Err(_) => {
                warn!("Could not create a preview for {}", file.0.name());
                None
            }
        }
    }

    fn revoke(&self, url: &str) {
        let _ = Url::revoke_object_url(url);
    }
}

/// A file picked through the file input or dropped onto the upload card
#[derive(Debug, Clone)]
pub struct BrowserFile(pub File);

#[async_trait(?Send)]
impl UploadSource for BrowserFile {
    fn file_name(&self) -> String {
        self.0.name()
    }

    async fn read_upload(&self) -> ApiResult<ImageUpload> {
        let buffer = JsFuture::from(self.0.array_buffer())
            .await
            .map_err(|_| ApiError::Decode(format!("Could not read {}", self.0.name())))?;
        let bytes = Uint8Array::new(&buffer).to_vec();
        if bytes.is_empty() {
            return Err(InputError::MissingFile.into());
        }
        Ok(ImageUpload::new(self.0.name(), self.0.type_(), bytes))
    }
}
