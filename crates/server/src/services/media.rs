//! Cloudinary client for product image hosting.
//!
//! The image host is an opaque store-and-fetch-URL service: this client
//! uploads a file and hands back the delivery URL, and deletes by public id.
//! Requests are authenticated with a SHA-256 signature over the sorted
//! parameters plus the API secret.

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::instrument;

use crate::config::CloudinaryConfig;

/// Cloudinary API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Errors that can occur when talking to the image host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A stored image, as returned by an upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    /// HTTPS delivery URL.
    #[serde(rename = "secure_url")]
    pub url: String,
    /// Public id used for later deletion.
    pub public_id: String,
}

/// Cloudinary API client for product images.
#[derive(Clone)]
pub struct CloudinaryClient {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    upload_folder: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            upload_folder: config.upload_folder.clone(),
        }
    }

    /// Upload an image into the configured folder.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` if the request fails or the response cannot be
    /// parsed.
    #[instrument(skip(self, bytes), fields(size = bytes.len(), filename = %filename))]
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadedImage, MediaError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_request(
            &format!("folder={}&timestamp={timestamp}", self.upload_folder),
            self.api_secret.expose_secret(),
        );

        let file_part = multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", self.upload_folder.clone())
            .text("signature", signature);

        let url = format!("{BASE_URL}/{}/image/upload", self.cloud_name);
        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadedImage = response
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;

        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(uploaded)
    }

    /// Delete an image by public id.
    ///
    /// Deleting an id that no longer exists is not an error; the host
    /// reports "not found" with a 200.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` if the request fails.
    #[instrument(skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_request(
            &format!("public_id={public_id}&timestamp={timestamp}"),
            self.api_secret.expose_secret(),
        );

        let url = format!("{BASE_URL}/{}/image/destroy", self.cloud_name);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("public_id", public_id),
                ("api_key", &self.api_key),
                ("timestamp", &timestamp.to_string()),
                ("signature", &signature),
            ])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Sign a request: SHA-256 over the serialized parameters plus the API secret.
fn sign_request(params: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(params.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the public id from a Cloudinary delivery URL.
///
/// Delivery URLs look like
/// `https://res.cloudinary.com/<cloud>/image/upload/<version>/<public_id>.<ext>`;
/// the public id is everything after the version segment, extension stripped.
/// Returns `None` for URLs not hosted on Cloudinary (e.g. an explicit
/// external `imageUrl`), in which case there is nothing to delete.
#[must_use]
pub fn extract_public_id(url: &str) -> Option<String> {
    let parts: Vec<&str> = url.split('/').collect();
    let upload_index = parts.iter().position(|segment| *segment == "upload")?;

    let path = parts.get(upload_index + 2..)?;
    if path.is_empty() {
        return None;
    }

    let with_ext = path.join("/");
    let dot = with_ext.rfind('.')?;
    with_ext.get(..dot).map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_request_known_digest() {
        let signature = sign_request("public_id=frechnel-shop/products/abc&timestamp=1700000000", "shhh");
        assert_eq!(
            signature,
            "de1bffe37b48ed6bafa59b73aa82f40722c8c7a46515226aa3d048ecf6c104dd"
        );
    }

    #[test]
    fn test_sign_request_depends_on_secret() {
        let a = sign_request("folder=f&timestamp=1", "secret-a");
        let b = sign_request("folder=f&timestamp=1", "secret-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_extract_public_id_typical_url() {
        let url =
            "https://res.cloudinary.com/frechnel/image/upload/v1712345678/frechnel-shop/products/abc123.jpg";
        assert_eq!(
            extract_public_id(url).unwrap(),
            "frechnel-shop/products/abc123"
        );
    }

    #[test]
    fn test_extract_public_id_no_folder() {
        let url = "https://res.cloudinary.com/frechnel/image/upload/v1/abc123.png";
        assert_eq!(extract_public_id(url).unwrap(), "abc123");
    }

    #[test]
    fn test_extract_public_id_external_url() {
        assert!(extract_public_id("https://example.com/a.jpg").is_none());
    }

    #[test]
    fn test_extract_public_id_no_extension() {
        let url = "https://res.cloudinary.com/frechnel/image/upload/v1/abc123";
        assert!(extract_public_id(url).is_none());
    }
}
