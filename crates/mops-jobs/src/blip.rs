//! Client for the Blip playout API
//!
//! Every call goes to `https://{customer}.amagi.tv/v1/api/...` with the
//! account token as the `token` query parameter. Media, playlist and
//! segment calls that Blip scopes to an account or a feed take a
//! [`MediaScope`].

use crate::error::{JobsError, Result};
use crate::http::{BaseUrl, HttpRequests, HttpSettings, RequestOptions};
use chrono::NaiveDate;
use reqwest::{Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Customer tenant and API token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlipDetails {
    pub customer: String,
    pub token: String,

    /// Overrides the `https://{customer}.amagi.tv` root
    #[serde(default)]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for BlipDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlipDetails")
            .field("customer", &self.customer)
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Account or feed a media listing is limited to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaScope {
    Account(String),
    Feed(String),
}

impl MediaScope {
    fn apply(&self, options: RequestOptions) -> RequestOptions {
        match self {
            MediaScope::Account(id) => options.param("account_id", id),
            MediaScope::Feed(id) => options.param("feed_id", id),
        }
    }
}

/// Where a playlist CSV export is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// The channel's generated playlist
    Channel {
        account_name: String,
        channel_code: String,
    },
    /// A playlist uploaded to a feed
    Uploaded { feed_id: String },
}

pub struct BlipClient {
    http: HttpRequests,
    base_url: BaseUrl,
    token: String,
}

impl BlipClient {
    pub fn new(details: &BlipDetails, settings: &HttpSettings) -> Result<Self> {
        let base_url = match details.base_url.as_deref() {
            Some(url) => BaseUrl::parse(url)?,
            None => {
                let customer = details.customer.trim();
                if customer.is_empty() {
                    return Err(JobsError::config("blip customer is required"));
                }
                BaseUrl::parse(&format!("https://{}.amagi.tv", customer))?
            },
        };

        debug!(base_url = %base_url.as_url(), "Blip client created");
        Ok(Self {
            http: HttpRequests::new(settings)?,
            base_url,
            token: details.token.clone(),
        })
    }

    fn options(&self) -> RequestOptions {
        RequestOptions::new().param("token", &self.token)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        self.base_url
            .join(["v1", "api"].iter().chain(segments.iter()))
    }

    async fn call(&self, method: Method, url: Url, options: RequestOptions) -> Result<Value> {
        info!(%method, url = %url, "Calling Blip");
        let response = self.http.send_checked(method, url.as_str(), options).await?;
        json_response(response).await
    }

    // ========================================================================
    // Feeds
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn feeds(&self) -> Result<Value> {
        let url = self.api_url(&["feeds"])?;
        self.call(Method::GET, url, self.options()).await
    }

    // ========================================================================
    // Media
    // ========================================================================

    /// Media of an account or feed; `extra` carries paging and filters
    #[instrument(skip(self))]
    pub async fn list_media(&self, scope: &MediaScope, extra: &[(&str, &str)]) -> Result<Value> {
        let url = self.api_url(&["media"])?;
        let options = extra
            .iter()
            .fold(scope.apply(self.options()), |options, (k, v)| options.param(*k, v));
        self.call(Method::GET, url, options).await
    }

    #[instrument(skip(self))]
    pub async fn media(&self, asset_id: &str, scope: &MediaScope) -> Result<Value> {
        let url = self.api_url(&["media", asset_id])?;
        self.call(Method::GET, url, scope.apply(self.options())).await
    }

    /// Whether Blip knows the media item; 404 is `false`, other failures
    /// are errors
    #[instrument(skip(self))]
    pub async fn media_exists(&self, media_id: &str, scope: &MediaScope) -> Result<bool> {
        let url = self.api_url(&["media", media_id])?;
        let response = self.http.head(url.as_str(), scope.apply(self.options())).await?;
        let status = response.status();

        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(JobsError::remote(status, String::new()))
        }
    }

    /// Replace the details of one media item
    #[instrument(skip(self, details))]
    pub async fn update_media(&self, media_id: &str, details: Value) -> Result<Value> {
        let url = self.api_url(&["media", &format!("{}.json", media_id)])?;
        info!(url = %url, "Updating Blip media");
        let response = self.http.put(url.as_str(), self.options().json(details)).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobsError::remote(status, body));
        }
        json_response(response).await
    }

    /// Upload a metadata sheet covering many media items
    #[instrument(skip(self, contents), fields(bytes = contents.len()))]
    pub async fn upload_metadata(
        &self,
        scope: &MediaScope,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Value> {
        let url = self.api_url(&["media", "meta_upload.json"])?;
        let options = scope.apply(self.options()).file("file", file_name, contents);
        self.call(Method::POST, url, options).await
    }

    #[instrument(skip(self))]
    pub async fn delete_media(&self, media_id: &str, scope: &MediaScope) -> Result<Value> {
        let url = self.api_url(&["media", media_id])?;
        info!(url = %url, "Deleting Blip media");
        let response = self.http.delete(url.as_str(), scope.apply(self.options())).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobsError::remote(status, body));
        }
        json_response(response).await
    }

    // ========================================================================
    // Segments
    // ========================================================================

    /// Register the segment layout of a media item on a feed
    #[instrument(skip(self))]
    pub async fn post_segments(&self, media_id: &str, feed_id: &str, duration: f64) -> Result<Value> {
        let url = self.api_url(&["media", media_id, "segments.json"])?;
        let options = self
            .options()
            .param("feed_id", feed_id)
            .param("duration", duration);
        self.call(Method::POST, url, options).await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn playlists(&self, extra: &[(&str, &str)]) -> Result<Value> {
        let url = self.api_url(&["playlist"])?;
        let options = extra
            .iter()
            .fold(self.options(), |options, (k, v)| options.param(*k, v));
        self.call(Method::GET, url, options).await
    }

    #[instrument(skip(self))]
    pub async fn playlist_details(&self, playlist_id: &str, feed_id: &str) -> Result<Value> {
        let url = self.api_url(&["playlist", &format!("{}.json", playlist_id)])?;
        self.call(Method::GET, url, self.options().param("feed_id", feed_id))
            .await
    }

    /// Playlist items whose media is not on Blip
    #[instrument(skip(self))]
    pub async fn missing_assets(&self, playlist_id: &str) -> Result<Value> {
        let url = self.api_url(&["playlist", playlist_id, "missing"])?;
        self.call(Method::GET, url, self.options()).await
    }

    /// Every playlist asset with its cloud and device status
    #[instrument(skip(self))]
    pub async fn playlist_assets(&self, playlist_id: &str) -> Result<Value> {
        let url = self.api_url(&["playlist", playlist_id, "assets.json"])?;
        self.call(Method::GET, url, self.options()).await
    }

    #[instrument(skip(self))]
    pub async fn playlist_asset_status(&self, playlist_id: &str) -> Result<Value> {
        let url = self.api_url(&["playlist", playlist_id, "asset_status"])?;
        self.call(Method::GET, url, self.options()).await
    }

    /// Normal playlists of one feed and day, newest first
    #[instrument(skip(self))]
    pub async fn day_playlists(
        &self,
        feed_id: &str,
        day: NaiveDate,
        published_only: bool,
    ) -> Result<Vec<Value>> {
        let url = self.api_url(&["playlist.json"])?;
        let day = day.format("%Y-%m-%d").to_string();
        let mut options = self
            .options()
            .param("feed_id", feed_id)
            .param("start_date", &day)
            .param("end_date", &day)
            .param("ptype", "normal")
            .param("auth_token", &self.token);
        if published_only {
            options = options.param("status", "published");
        }

        let mut playlists = match self.call(Method::GET, url, options).await? {
            Value::Object(mut body) => match body.remove("playlists") {
                Some(Value::Array(list)) => list,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        playlists.sort_by(|a, b| b["created_at"].as_str().cmp(&a["created_at"].as_str()));
        Ok(playlists)
    }

    /// Playlist export as CSV text
    #[instrument(skip(self))]
    pub async fn playlist_csv(&self, playlist_id: &str, source: &PlaylistSource) -> Result<String> {
        let (url, options) = match source {
            PlaylistSource::Channel {
                account_name,
                channel_code,
            } => (
                self.base_url.join([
                    account_name.as_str(),
                    channel_code.as_str(),
                    "playlist",
                    &format!("{}.csv", playlist_id),
                ])?,
                self.options(),
            ),
            PlaylistSource::Uploaded { feed_id } => (
                self.api_url(&["playlist", playlist_id, "download"])?,
                self.options().param("feed_id", feed_id),
            ),
        };

        let options = options.param("auth_token", &self.token);
        let response = self.http.send_checked(Method::GET, url.as_str(), options).await?;
        Ok(response.text().await?)
    }
}

async fn json_response(response: Response) -> Result<Value> {
    let text = response.text().await?;
    debug!(response = %text, "Response from Blip");
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| JobsError::parse(format!("Blip response: {}", e)))
}
