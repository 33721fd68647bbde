// X API v2 client — bearer-token REST over HTTP.
//
// A thin reqwest wrapper with one generic GET helper, the same shape as the
// other HTTP clients in this crate. Every response feeds the rate-limit
// state so callers can back off before the next request.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::rate_limit::RateLimitState;

/// Default X API v2 endpoint.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for the user timeline endpoint (API maximum).
const MAX_RESULTS: &str = "100";

pub struct XClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
    rate_limit: RateLimitState,
}

impl XClient {
    /// Create a client against the public X API.
    pub fn new(bearer_token: &str) -> Result<Self> {
        Self::with_base_url(bearer_token, DEFAULT_API_URL)
    }

    /// Create a client against a different base URL (for testing or proxies).
    pub fn with_base_url(bearer_token: &str, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xmon/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
            rate_limit: RateLimitState::new(),
        })
    }

    /// Rate-limit state as of the last response.
    pub fn rate_limit(&self) -> &RateLimitState {
        &self.rate_limit
    }

    /// Sleep first if the last response said the window is nearly spent.
    pub async fn wait_for_rate_limit(&self) {
        self.rate_limit.wait_for_rate_limit().await;
    }

    /// GET `{base}{path}` with query params and deserialize the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!(path = path, "X API GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(params)
            .send()
            .await
            .with_context(|| format!("X API request failed: {path}"))?;

        self.rate_limit.update_from_headers(response.headers());

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("X API {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize {path} response"))
    }

    /// Look up a user's profile by handle.
    pub async fn get_user(&self, handle: &str) -> Result<XUser> {
        let path = format!("/users/by/username/{handle}");
        let resp: UserResponse = self
            .get(&path, &[("user.fields", "description,public_metrics")])
            .await
            .with_context(|| format!("Failed to look up @{handle}"))?;

        match resp.data {
            Some(user) => Ok(user),
            None => {
                let detail = resp
                    .errors
                    .first()
                    .map(|e| e.detail.clone())
                    .unwrap_or_else(|| "no user data returned".to_string());
                anyhow::bail!("User @{handle} not found: {detail}")
            }
        }
    }

    /// Fetch a user's recent posts, optionally only those newer than `since_id`.
    ///
    /// Referenced posts and their authors are requested as expansions so a
    /// repost's original author can be resolved without extra calls.
    pub async fn get_user_posts(
        &self,
        user_id: &str,
        since_id: Option<&str>,
    ) -> Result<TweetsResponse> {
        let path = format!("/users/{user_id}/tweets");
        let mut params: Vec<(&str, &str)> = vec![
            ("max_results", MAX_RESULTS),
            (
                "tweet.fields",
                "created_at,public_metrics,referenced_tweets,author_id",
            ),
            ("expansions", "referenced_tweets.id.author_id"),
            ("user.fields", "username"),
        ];
        if let Some(id) = since_id {
            params.push(("since_id", id));
        }

        self.get(&path, &params).await
    }
}

// -- Serde types for X API v2 responses --

#[derive(Debug, Clone, Deserialize)]
pub struct XUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public_metrics: Option<UserMetrics>,
}

impl XUser {
    pub fn followers(&self) -> i64 {
        self.public_metrics
            .as_ref()
            .map(|m| m.followers_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetrics {
    #[serde(default)]
    pub followers_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: Option<TweetMetrics>,
    #[serde(default)]
    pub referenced_tweets: Vec<ReferencedTweet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetMetrics {
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub retweet_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferencedTweet {
    /// "retweeted", "quoted", or "replied_to"
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    data: Option<XUser>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TweetsResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: Includes,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<XUser>,
    #[serde(default)]
    pub tweets: Vec<Tweet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub result_count: i64,
}
