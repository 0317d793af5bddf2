//! Registering and triggering scrape jobs
//!
//! A dispatch appends one row to the pending-work feed and then pokes the
//! external worker. Registration must succeed; the trigger is best-effort
//! unless `require-trigger` is set, because the worker also polls its queue
//! on its own.

use crate::config::DispatchConfig;
use crate::dispatch::job::{build_job_url, ScrapeJob};
use crate::geo::Coordinate;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;

/// The job could not be registered, or a required trigger was not delivered
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("pending-work feed append failed: {0}")]
    PendingFeed(#[from] reqwest::Error),

    #[error("pending-work feed rejected the row with HTTP {0}")]
    PendingFeedStatus(u16),

    #[error("worker trigger was not delivered: {0}")]
    Trigger(String),
}

/// Starts external scrape jobs
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        business_type: &str,
        origin: Coordinate,
    ) -> Result<ScrapeJob, DispatchError>;
}

/// [`Dispatcher`] talking to an HTTP append endpoint and a webhook trigger
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    config: DispatchConfig,
}

impl HttpDispatcher {
    pub fn new(client: Client, config: DispatchConfig) -> Self {
        Self { client, config }
    }

    /// Appends `[job_url, ""]` to the pending-work feed
    ///
    /// The empty second cell is the status placeholder the worker fills in.
    async fn register(&self, job_url: &str) -> Result<(), DispatchError> {
        let mut request = self
            .client
            .post(&self.config.pending_feed_url)
            .json(&json!({ "values": [[job_url, ""]] }));

        if let Some(token) = &self.config.pending_feed_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::PendingFeedStatus(status.as_u16()));
        }
        Ok(())
    }

    /// Fires the worker trigger; any HTTP response counts as delivered
    async fn trigger(&self) -> Result<(), reqwest::Error> {
        let response = self.client.get(&self.config.trigger_url).send().await?;
        tracing::debug!("Worker trigger answered HTTP {}", response.status());
        Ok(())
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        business_type: &str,
        origin: Coordinate,
    ) -> Result<ScrapeJob, DispatchError> {
        if business_type.trim().is_empty() {
            return Err(DispatchError::InvalidJob(
                "business type cannot be empty".to_string(),
            ));
        }

        let job_url = build_job_url(
            &self.config.search_base_url,
            business_type,
            origin,
            self.config.zoom,
        )
        .map_err(DispatchError::InvalidJob)?;

        let dispatched_at = Utc::now();
        self.register(&job_url).await?;
        tracing::info!("Registered scrape job {}", job_url);

        let trigger_delivered = match self.trigger().await {
            Ok(()) => true,
            Err(e) if self.config.require_trigger => {
                return Err(DispatchError::Trigger(e.to_string()));
            }
            Err(e) => {
                tracing::warn!("Worker trigger not delivered, relying on worker queue poll: {}", e);
                false
            }
        };

        Ok(ScrapeJob {
            business_type: business_type.trim().to_string(),
            origin,
            dispatched_at,
            job_url,
            trigger_delivered,
        })
    }
}
