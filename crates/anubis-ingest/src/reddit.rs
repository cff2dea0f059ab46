//! A thin Reddit API client: application-only OAuth, `top` listings and
//! lookup by id.

use std::time::Duration;

use anubis_core::LiveSubmission;
use reqwest::Client;
use serde::Deserialize;
use tokio::time::Instant;

use crate::{
  Error, Result,
  live::{FlairSource, ListingPage, Listings, TimeWindow},
};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// `/by_id` accepts at most this many fullnames per request.
const MAX_IDS_PER_LOOKUP: usize = 100;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// Credentials of a Reddit "script" or "web" app.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
  pub client_id:     String,
  pub client_secret: String,
  /// Reddit rejects requests with generic user agents.
  pub user_agent:    String,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
  access_token: Option<String>,
  #[serde(default = "default_expires_in")]
  expires_in:   u64,
  error:        Option<String>,
}

fn default_expires_in() -> u64 { 3600 }

#[derive(Deserialize)]
struct Thing<T> {
  data: T,
}

#[derive(Deserialize)]
struct Listing {
  after:    Option<String>,
  #[serde(default)]
  children: Vec<Thing<LiveSubmission>>,
}

impl From<Listing> for ListingPage {
  fn from(listing: Listing) -> Self {
    Self {
      submissions: listing.children.into_iter().map(|c| c.data).collect(),
      after:       listing.after,
    }
  }
}

struct AccessToken {
  value:      String,
  expires_at: Instant,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Reddit API client with application-only OAuth.
///
/// Requests are spaced at least `request_interval` apart; the bot makes one
/// request at a time, so this is all the rate limiting it needs.
pub struct RedditClient {
  http:             Client,
  credentials:      RedditCredentials,
  token:            Option<AccessToken>,
  request_interval: Duration,
  last_request:     Option<Instant>,
}

impl RedditClient {
  pub fn new(credentials: RedditCredentials, request_interval: Duration) -> Result<Self> {
    let http = Client::builder()
      .user_agent(credentials.user_agent.clone())
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self {
      http,
      credentials,
      token: None,
      request_interval,
      last_request: None,
    })
  }

  /// Fetch a token up front so bad credentials fail fast.
  pub async fn authenticate(&mut self) -> Result<()> {
    self.bearer().await.map(drop)
  }

  async fn bearer(&mut self) -> Result<String> {
    if let Some(token) = &self.token
      && Instant::now() + TOKEN_SLACK < token.expires_at
    {
      return Ok(token.value.clone());
    }

    self.throttle().await;
    let response: TokenResponse = self
      .http
      .post(TOKEN_URL)
      .basic_auth(
        &self.credentials.client_id,
        Some(&self.credentials.client_secret),
      )
      .form(&[("grant_type", "client_credentials")])
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    let value = match (response.access_token, response.error) {
      (Some(value), _) => value,
      (None, Some(error)) => return Err(Error::Auth(error)),
      (None, None) => return Err(Error::Auth("no access token in response".into())),
    };

    tracing::info!(expires_in = response.expires_in, "obtained reddit access token");
    self.token = Some(AccessToken {
      value:      value.clone(),
      expires_at: Instant::now() + Duration::from_secs(response.expires_in),
    });
    Ok(value)
  }

  async fn throttle(&mut self) {
    if let Some(last) = self.last_request {
      tokio::time::sleep_until(last + self.request_interval).await;
    }
    self.last_request = Some(Instant::now());
  }

  async fn get_listing(&mut self, path: &str, query: &[(&str, String)]) -> Result<Listing> {
    let token = self.bearer().await?;
    self.throttle().await;

    let listing = self
      .http
      .get(format!("{API_BASE}{path}"))
      .bearer_auth(token)
      .query(query)
      .query(&[("raw_json", "1")])
      .send()
      .await?
      .error_for_status()?
      .json::<Thing<Listing>>()
      .await?;
    Ok(listing.data)
  }
}

impl Listings for RedditClient {
  async fn top(
    &mut self,
    subreddit: &str,
    window: TimeWindow,
    after: Option<&str>,
    limit: u32,
  ) -> Result<ListingPage> {
    let mut query = vec![
      ("t", window.as_str().to_owned()),
      ("limit", limit.to_string()),
    ];
    if let Some(after) = after {
      query.push(("after", after.to_owned()));
    }

    let listing = self
      .get_listing(&format!("/r/{subreddit}/top"), &query)
      .await?;
    Ok(listing.into())
  }
}

impl FlairSource for RedditClient {
  async fn lookup(&mut self, ids: &[String]) -> Result<Vec<LiveSubmission>> {
    let mut found = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_IDS_PER_LOOKUP) {
      let names = chunk
        .iter()
        .map(|id| format!("t3_{id}"))
        .collect::<Vec<_>>()
        .join(",");
      let listing = self.get_listing(&format!("/by_id/{names}"), &[]).await?;
      found.extend(listing.children.into_iter().map(|c| c.data));
    }
    Ok(found)
  }
}
