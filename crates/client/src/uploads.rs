//! Direct product image uploads to ImgBB.
//!
//! Files are sent one after another, never in parallel, to stay clear of the
//! host's rate limits. The progress callback sees `index` go from 0 to
//! `total`, the last call marking completion.

use std::time::Duration;

use reqwest::multipart::Form;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::ImageFile;

/// ImgBB upload endpoint.
pub const IMGBB_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Most images a product form accepts at once.
pub const MAX_IMAGES: usize = 5;

/// Errors from image uploads.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing ImgBB API key. Set IMGBB_API_KEY")]
    MissingApiKey,

    #[error("You can upload maximum {limit} images")]
    TooMany { limit: usize },

    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with an error.
    #[error("{0}")]
    Rejected(String),

    #[error("ImgBB upload succeeded but no URL returned")]
    MissingUrl,
}

/// Position in a multi-file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    data: Option<ImgbbData>,
    #[serde(default)]
    error: Option<ImgbbError>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImgbbError {
    #[serde(default)]
    message: Option<String>,
}

/// Uploader bound to one API key.
#[derive(Clone)]
pub struct ImageUploader {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl std::fmt::Debug for ImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploader")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ImageUploader {
    /// Uploader for the public ImgBB endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MissingApiKey`] if no usable key is given.
    pub fn new(api_key: Option<SecretString>, timeout: Duration) -> Result<Self, UploadError> {
        Self::with_endpoint(api_key, IMGBB_ENDPOINT, timeout)
    }

    /// Uploader for another ImgBB-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::MissingApiKey`] if no usable key is given.
    pub fn with_endpoint(
        api_key: Option<SecretString>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let api_key = api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(UploadError::MissingApiKey)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    /// Upload one image and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails or the reply has no URL.
    #[instrument(skip(self, file), fields(file = %file.file_name))]
    pub async fn upload_image(&self, file: ImageFile) -> Result<String, UploadError> {
        let form = Form::new()
            .text("key", self.api_key.expose_secret().trim().to_string())
            .part("image", file.into_part());

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Option<ImgbbResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = body
                .and_then(|b| b.error.and_then(|e| e.message).or(b.message))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(status = %status, %message, "Image upload rejected");
            return Err(UploadError::Rejected(message));
        }

        let url = body
            .and_then(|b| b.data)
            .and_then(|d| d.url)
            .filter(|url| !url.is_empty())
            .ok_or(UploadError::MissingUrl)?;
        debug!(%url, "Image uploaded");
        Ok(url)
    }

    /// Upload up to `limit` images in order, reporting progress.
    ///
    /// An empty list makes no request and no progress calls.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooMany`] before uploading anything if there
    /// are more than `limit` files, or the first upload error.
    pub async fn upload_images<F>(
        &self,
        files: Vec<ImageFile>,
        limit: usize,
        mut on_progress: F,
    ) -> Result<Vec<String>, UploadError>
    where
        F: FnMut(UploadProgress),
    {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        if files.len() > limit {
            return Err(UploadError::TooMany { limit });
        }

        let total = files.len();
        let mut urls = Vec::with_capacity(total);
        for (index, file) in files.into_iter().enumerate() {
            on_progress(UploadProgress { index, total });
            urls.push(self.upload_image(file).await?);
        }
        on_progress(UploadProgress {
            index: total,
            total,
        });

        info!(count = total, "Images uploaded");
        Ok(urls)
    }
}
