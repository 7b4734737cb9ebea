use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{Cargo, CargoId, CargoStatus, TrackingEntry},
    protocol::{CargoDraft, CargoEndpoint, TrackingDraft},
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod form;
pub mod state;

pub use controller::{AlwaysConfirm, CargoListController, DeleteConfirmation, Outcome};
pub use form::{CargoField, CargoForm, FormError};
pub use state::{filter_cargos, Action, CargoDialog, CargoScreenState, Effect, RequestId};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The slice of the cargo backend used by the admin screens. Any non-2xx
/// response is an error; response bodies of failures are never inspected.
#[async_trait]
pub trait CargoApi: Send + Sync {
    async fn list_cargo(&self) -> Result<Vec<Cargo>>;
    async fn create_cargo(&self, draft: &CargoDraft) -> Result<()>;
    async fn update_cargo(&self, cargo_id: &CargoId, draft: &CargoDraft) -> Result<()>;
    async fn delete_cargo(&self, cargo_id: &CargoId) -> Result<()>;
    /// `Ok(None)` when the backend answers 404.
    async fn get_cargo(&self, cargo_id: &CargoId) -> Result<Option<Cargo>>;
    async fn list_cargo_by_status(&self, status: CargoStatus) -> Result<Vec<Cargo>>;
    async fn count_cargo_by_status(&self, status: CargoStatus) -> Result<u64>;
    async fn list_cargo_by_flight(&self, flight_number: &str) -> Result<Vec<Cargo>>;
    /// Server-side keyword search over shipper, consignee and flight number.
    async fn search_cargo(&self, keyword: &str) -> Result<Vec<Cargo>>;
    /// Newest entry first, as the backend orders them.
    async fn list_tracking(&self, cargo_id: &CargoId) -> Result<Vec<TrackingEntry>>;
    async fn create_tracking(
        &self,
        cargo_id: &CargoId,
        draft: &TrackingDraft,
    ) -> Result<TrackingEntry>;
}

#[derive(Debug, Clone)]
pub struct HttpCargoApi {
    http: Client,
    base_url: Url,
}

impl HttpCargoApi {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_timeout(server_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Self::with_client(http, server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self> {
        let base_url = Url::parse(server_url.trim())
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "unsupported scheme '{}' in server url '{server_url}'",
                base_url.scheme()
            );
        }
        Ok(Self { http, base_url })
    }

    /// Appends the endpoint below any path prefix of the server url.
    fn endpoint_url(&self, endpoint: CargoEndpoint<'_>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| anyhow!("server url '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }
}

#[async_trait]
impl CargoApi for HttpCargoApi {
    async fn list_cargo(&self) -> Result<Vec<Cargo>> {
        let url = self.endpoint_url(CargoEndpoint::Collection)?;
        let cargos: Vec<Cargo> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("failed to decode cargo list")?;
        debug!(count = cargos.len(), "fetched cargo list");
        Ok(cargos)
    }

    async fn create_cargo(&self, draft: &CargoDraft) -> Result<()> {
        let url = self.endpoint_url(CargoEndpoint::Collection)?;
        self.http
            .post(url)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn update_cargo(&self, cargo_id: &CargoId, draft: &CargoDraft) -> Result<()> {
        let url = self.endpoint_url(CargoEndpoint::Item(cargo_id))?;
        self.http
            .put(url)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_cargo(&self, cargo_id: &CargoId) -> Result<()> {
        let url = self.endpoint_url(CargoEndpoint::Item(cargo_id))?;
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    async fn get_cargo(&self, cargo_id: &CargoId) -> Result<Option<Cargo>> {
        let url = self.endpoint_url(CargoEndpoint::Item(cargo_id))?;
        let res = self.http.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let cargo = res
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode cargo {cargo_id}"))?;
        Ok(Some(cargo))
    }

    async fn list_cargo_by_status(&self, status: CargoStatus) -> Result<Vec<Cargo>> {
        let url = self.endpoint_url(CargoEndpoint::ByStatus(status))?;
        let cargos = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode cargo list for status {status}"))?;
        Ok(cargos)
    }

    async fn count_cargo_by_status(&self, status: CargoStatus) -> Result<u64> {
        let url = self.endpoint_url(CargoEndpoint::CountByStatus(status))?;
        let count = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(count)
    }

    async fn list_cargo_by_flight(&self, flight_number: &str) -> Result<Vec<Cargo>> {
        let url = self.endpoint_url(CargoEndpoint::ByFlight(flight_number))?;
        let cargos = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode cargo list for flight {flight_number}"))?;
        Ok(cargos)
    }

    async fn search_cargo(&self, keyword: &str) -> Result<Vec<Cargo>> {
        let url = self.endpoint_url(CargoEndpoint::Search)?;
        let cargos: Vec<Cargo> = self
            .http
            .get(url)
            .query(&[("keyword", keyword)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("failed to decode cargo search results")?;
        debug!(keyword, count = cargos.len(), "searched cargo");
        Ok(cargos)
    }

    async fn list_tracking(&self, cargo_id: &CargoId) -> Result<Vec<TrackingEntry>> {
        let url = self.endpoint_url(CargoEndpoint::Tracking(cargo_id))?;
        let entries = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode tracking for cargo {cargo_id}"))?;
        Ok(entries)
    }

    async fn create_tracking(
        &self,
        cargo_id: &CargoId,
        draft: &TrackingDraft,
    ) -> Result<TrackingEntry> {
        let url = self.endpoint_url(CargoEndpoint::Tracking(cargo_id))?;
        let entry = self
            .http
            .post(url)
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode tracking entry for cargo {cargo_id}"))?;
        Ok(entry)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
