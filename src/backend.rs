//! Read-only client for the recorder's HTTP API.
//!
//! Endpoints consumed:
//!   GET  /api/cameras                                        → camera list
//!   GET  /api/camera/{camera}                                → availability
//!   GET  /api/camera/{camera}/{date}/{seg}/existing_segments → chunk indices
//!   GET  /videos/{camera}/{date}/{seg}/stream.m3u8           → HLS manifest
//!   GET  /videos/{camera}/{date}/{seg}/thumbnails/{NNN}.jpg  → thumbnail

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::availability::DayAvailability;
use crate::camera::Camera;
use crate::config::BackendConfig;
use crate::error::{Result, ViewerError};
use crate::timeline::ExistingSegments;

/// The recorder, as seen by a viewing session.
pub trait Backend: Send + Sync + 'static {
    fn cameras(&self) -> impl Future<Output = Result<Vec<Camera>>> + Send;

    fn availability(&self, camera: &str) -> impl Future<Output = Result<Vec<DayAvailability>>> + Send;

    fn existing_segments(
        &self,
        camera: &str,
        date: &str,
        segment: &str,
    ) -> impl Future<Output = Result<ExistingSegments>> + Send;
}

/// Resolve a media identifier (`{cam}/{date}/{seg}/…`) against the
/// recorder's base URL. An empty identifier stays empty.
pub fn media_url(base_url: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        return String::new();
    }
    format!("{}/videos/{}", base_url.trim_end_matches('/'), identifier)
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url, "GET");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        serde_json::from_str(&body).map_err(|e| ViewerError::Decode {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}

impl Backend for HttpBackend {
    async fn cameras(&self) -> Result<Vec<Camera>> {
        let cameras: Option<Vec<Camera>> = self.get_json("/api/cameras").await?;
        Ok(cameras.unwrap_or_default())
    }

    async fn availability(&self, camera: &str) -> Result<Vec<DayAvailability>> {
        let days: Option<Vec<DayAvailability>> =
            self.get_json(&format!("/api/camera/{camera}")).await?;
        Ok(days.unwrap_or_default())
    }

    async fn existing_segments(
        &self,
        camera: &str,
        date: &str,
        segment: &str,
    ) -> Result<ExistingSegments> {
        self.get_json(&format!("/api/camera/{camera}/{date}/{segment}/existing_segments"))
            .await
    }
}
