use log::{debug, error, info};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::bulk::BulkAction;
use crate::error::BookDeskError;

/// Request body for the status change endpoint
#[derive(Debug, Serialize)]
pub struct StatusChangeRequest<'a> {
    pub status: &'a str,
}

/// Request body for the bulk action endpoint
#[derive(Debug, Serialize)]
pub struct BulkActionRequest<'a> {
    pub action: BulkAction,
    pub items: &'a [String],
}

/// HTTP client for the admin endpoints of the bookstore backend.
///
/// Requests are sent once: no retry and no timeout. A request succeeds when
/// the backend answers with a success status; response bodies of the
/// mutating endpoints are never read.
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base_url: Url,
    bulk_action_path: String,
}

impl AdminClient {
    pub fn new(base_url: &str, bulk_action_path: &str) -> Result<Self, BookDeskError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BookDeskError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url,
            bulk_action_path: bulk_action_path.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URLs are used as given; anything else is joined onto the
    /// base URL.
    pub fn resolve(&self, target: &str) -> Result<Url, BookDeskError> {
        self.base_url
            .join(target)
            .map_err(|e| BookDeskError::InvalidUrl(format!("{}: {}", target, e)))
    }

    /// PATCH `{"status": ...}` to `status_url`.
    pub async fn change_status(&self, status_url: &str, status: &str) -> Result<(), BookDeskError> {
        let url = self.resolve(status_url)?;
        debug!("PATCH {} status={}", url, status);

        let response = self
            .client
            .patch(url.clone())
            .json(&StatusChangeRequest { status })
            .send()
            .await
            .map_err(|e| {
                error!("Status change request to {} failed: {}", url, e);
                BookDeskError::HttpError(e)
            })?;

        Self::ensure_success(&url, response.status())
    }

    /// POST `{"action": ..., "items": [...]}` to the bulk action endpoint.
    /// An empty selection is rejected without touching the network.
    pub async fn bulk_action(
        &self,
        action: BulkAction,
        items: &[String],
    ) -> Result<(), BookDeskError> {
        if items.is_empty() {
            return Err(BookDeskError::BulkRejected(
                "No items selected".to_string(),
            ));
        }

        let url = self.resolve(&self.bulk_action_path)?;
        debug!("POST {} action={} items={}", url, action, items.len());

        let response = self
            .client
            .post(url.clone())
            .json(&BulkActionRequest { action, items })
            .send()
            .await
            .map_err(|e| {
                error!("Bulk action request to {} failed: {}", url, e);
                BookDeskError::HttpError(e)
            })?;

        Self::ensure_success(&url, response.status())
    }

    /// GET a page, following redirects. Returns the address that finally
    /// answered.
    pub async fn fetch_page(&self, url: &Url) -> Result<Url, BookDeskError> {
        let response = self.client.get(url.clone()).send().await?;
        Self::ensure_success(url, response.status())?;

        let final_url = response.url().clone();
        let body = response.bytes().await?;
        info!("Loaded {} ({} bytes)", final_url, body.len());
        Ok(final_url)
    }

    fn ensure_success(url: &Url, status: reqwest::StatusCode) -> Result<(), BookDeskError> {
        if status.is_success() {
            Ok(())
        } else {
            error!("{} answered {}", url, status);
            Err(BookDeskError::RequestFailed {
                status: status.as_u16(),
            })
        }
    }
}
