use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::{RecordingPage, Region, SpeciesName};
use crate::error::HarvestError;

pub const DEFAULT_BASE_URL: &str = "https://xeno-canto.org";

pub trait XenoCantoClient: Send + Sync {
    /// One page of search results for `<species> cnt:<region>`, pages
    /// numbered from 1.
    fn search_page(
        &self,
        species: &SpeciesName,
        region: &Region,
        page: u32,
    ) -> Result<RecordingPage, HarvestError>;

    /// Fetch the full audio payload into `destination`. Single attempt,
    /// bounded by the configured download timeout.
    fn download_audio(&self, url: &str, destination: &Path) -> Result<(), HarvestError>;
}

impl<C: XenoCantoClient + ?Sized> XenoCantoClient for std::sync::Arc<C> {
    fn search_page(
        &self,
        species: &SpeciesName,
        region: &Region,
        page: u32,
    ) -> Result<RecordingPage, HarvestError> {
        self.as_ref().search_page(species, region, page)
    }

    fn download_audio(&self, url: &str, destination: &Path) -> Result<(), HarvestError> {
        self.as_ref().download_audio(url, destination)
    }
}

#[derive(Clone)]
pub struct XenoCantoHttpClient {
    client: Client,
    base_url: String,
    download_timeout: Duration,
}

impl XenoCantoHttpClient {
    pub fn new(download_timeout: Duration) -> Result<Self, HarvestError> {
        Self::with_base_url(DEFAULT_BASE_URL, download_timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        download_timeout: Duration,
    ) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("xeno-harvest/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HarvestError::XenoHttp(err.to_string()))?,
        );

        // No client-wide timeout: page queries block until the server
        // answers. Only the binary download is bounded, per request.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(None)
            .build()
            .map_err(|err| HarvestError::XenoHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            download_timeout,
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, HarvestError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "xeno-canto request failed".to_string());
        Err(HarvestError::XenoStatus { status, message })
    }
}

impl XenoCantoClient for XenoCantoHttpClient {
    fn search_page(
        &self,
        species: &SpeciesName,
        region: &Region,
        page: u32,
    ) -> Result<RecordingPage, HarvestError> {
        let url = format!("{}/api/2/recordings", self.base_url);
        let query = format!("{species} cnt:{region}");

        let response = self
            .client
            .get(&url)
            .query(&[("query", query.as_str()), ("page", &page.to_string())])
            .send()
            .map_err(|err| HarvestError::XenoHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;

        response
            .json::<RecordingPage>()
            .map_err(|err| HarvestError::ApiShape(err.to_string()))
    }

    fn download_audio(&self, url: &str, destination: &Path) -> Result<(), HarvestError> {
        let url = normalize_audio_url(url);
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .map_err(|err| HarvestError::XenoHttp(err.to_string()))?;
        let mut response = Self::handle_status(response)?;

        let mut file = File::create(destination)
            .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| HarvestError::XenoHttp(err.to_string()))?;
        Ok(())
    }
}

/// Human-viewable reference URL for a recording's detail page.
pub fn detail_url(id: &str) -> String {
    format!("{DEFAULT_BASE_URL}/{id}")
}

/// The API hands back scheme-relative file URLs (`//host/path`); pin those
/// to https before fetching.
pub fn normalize_audio_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}
