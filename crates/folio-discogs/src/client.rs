use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DiscogsConfig;
use crate::wire::{WireMaster, WireRelease, WireVersionsPage};

#[derive(Error, Debug)]
pub enum DiscogsError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("{0} not found")]
  NotFound(String),
  #[error("API rate limit exceeded")]
  RateLimit,
  #[error("Discogs returned {status}: {body}")]
  Status { status: u16, body: String },
  #[error("cannot decode {path}: {source}")]
  Decode {
    path: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Cliente HTTP de la API pública de Discogs.
///
/// Un 429 se reintenta una sola vez tras `rate_limit_retry_secs`.
#[derive(Clone)]
pub struct DiscogsClient {
  http: Client,
  base_url: String,
  authorization: Option<String>,
  rate_limit_retry: Duration,
}

impl DiscogsClient {
  pub fn new(cfg: &DiscogsConfig) -> Result<Self, DiscogsError> {
    let http = Client::builder()
      .user_agent(cfg.user_agent.clone())
      .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
      .build()?;

    Ok(Self {
      http,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      authorization: cfg.authorization(),
      rate_limit_retry: Duration::from_secs(cfg.rate_limit_retry_secs),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn is_authenticated(&self) -> bool {
    self.authorization.is_some()
  }

  pub async fn master(&self, id: u64) -> Result<WireMaster, DiscogsError> {
    self.get_json(&format!("/masters/{id}"), &[]).await
  }

  pub async fn master_versions(&self, id: u64, page: u32, per_page: u32) -> Result<WireVersionsPage, DiscogsError> {
    let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
    self.get_json(&format!("/masters/{id}/versions"), &query).await
  }

  pub async fn release(&self, id: u64) -> Result<WireRelease, DiscogsError> {
    self.get_json(&format!("/releases/{id}"), &[]).await
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, DiscogsError> {
    let url = format!("{}{}", self.base_url, path);
    let mut retried = false;

    loop {
      debug!(url = %url, ?query, "GET discogs");

      let mut request = self.http.get(&url).query(query);
      if let Some(auth) = &self.authorization {
        request = request.header(header::AUTHORIZATION, auth);
      }
      let response = request.send().await?;
      let status = response.status();

      if status == StatusCode::TOO_MANY_REQUESTS {
        if retried {
          warn!(path, "discogs rate limit hit again after waiting");
          return Err(DiscogsError::RateLimit);
        }
        warn!(path, wait_secs = self.rate_limit_retry.as_secs(), "discogs rate limited, waiting before retry");
        tokio::time::sleep(self.rate_limit_retry).await;
        retried = true;
        continue;
      }

      if status == StatusCode::NOT_FOUND {
        return Err(DiscogsError::NotFound(path.to_string()));
      }

      if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DiscogsError::Status { status: status.as_u16(), body });
      }

      let body = response.text().await?;
      return serde_json::from_str(&body).map_err(|source| DiscogsError::Decode { path: path.to_string(), source });
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::wire::fixtures;
  use axum::Router;
  use axum::extract::{Path, Query};
  use axum::http::{HeaderMap, StatusCode as AxumStatus};
  use axum::routing::get;
  use std::collections::HashMap;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }

  fn client_for(base_url: String, cfg: DiscogsConfig) -> DiscogsClient {
    DiscogsClient::new(&DiscogsConfig { base_url, rate_limit_retry_secs: 0, ..cfg }).unwrap()
  }

  #[tokio::test]
  async fn fetches_and_decodes_a_master_with_auth_header() {
    let app = Router::new().route(
      "/masters/:id",
      get(|Path(id): Path<u64>, headers: HeaderMap| async move {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
        if id == 96559 && auth == "Discogs key=k, secret=s" {
          (AxumStatus::OK, fixtures::MASTER.to_string())
        } else {
          (AxumStatus::UNAUTHORIZED, format!("bad auth {auth}"))
        }
      }),
    );
    let base = serve(app).await;
    let cfg = DiscogsConfig { consumer_key: Some("k".into()), consumer_secret: Some("s".into()), ..Default::default() };
    let client = client_for(base, cfg);

    let master = client.master(96559).await.unwrap();
    assert_eq!(master.title, "Elis & Tom");
  }

  #[tokio::test]
  async fn versions_request_carries_pagination() {
    let app = Router::new().route(
      "/masters/:id/versions",
      get(|Query(q): Query<HashMap<String, String>>| async move {
        if q.get("page").map(String::as_str) == Some("2") && q.get("per_page").map(String::as_str) == Some("10") {
          (AxumStatus::OK, fixtures::VERSIONS.to_string())
        } else {
          (AxumStatus::BAD_REQUEST, String::new())
        }
      }),
    );
    let client = client_for(serve(app).await, DiscogsConfig::default());

    let page = client.master_versions(96559, 2, 10).await.unwrap();
    assert_eq!(page.versions.len(), 2);
  }

  #[tokio::test]
  async fn maps_404_and_other_statuses() {
    let app = Router::new()
      .route("/releases/1", get(|| async { (AxumStatus::NOT_FOUND, "{\"message\": \"Release not found.\"}") }))
      .route("/releases/2", get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "oops") }))
      .route("/releases/3", get(|| async { (AxumStatus::OK, "{\"id\": \"not a number\"}") }));
    let client = client_for(serve(app).await, DiscogsConfig::default());

    assert!(matches!(client.release(1).await, Err(DiscogsError::NotFound(p)) if p == "/releases/1"));
    assert!(matches!(client.release(2).await, Err(DiscogsError::Status { status: 500, body }) if body == "oops"));
    assert!(matches!(client.release(3).await, Err(DiscogsError::Decode { .. })));
  }

  #[tokio::test]
  async fn retries_once_after_429() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
      "/releases/:id",
      get(move || {
        let counter = counter.clone();
        async move {
          if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            (AxumStatus::TOO_MANY_REQUESTS, String::new())
          } else {
            (AxumStatus::OK, fixtures::RELEASE.to_string())
          }
        }
      }),
    );
    let client = client_for(serve(app).await, DiscogsConfig::default());

    let release = client.release(1143457).await.unwrap();
    assert_eq!(release.id, 1143457);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn second_429_is_rate_limit_error() {
    let app = Router::new().route("/releases/:id", get(|| async { (AxumStatus::TOO_MANY_REQUESTS, "") }));
    let client = client_for(serve(app).await, DiscogsConfig::default());

    assert!(matches!(client.release(1).await, Err(DiscogsError::RateLimit)));
  }
}
