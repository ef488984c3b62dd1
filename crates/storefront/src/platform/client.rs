//! Platform REST API client implementation.
//!
//! Plain JSON over reqwest. Profile reads go through a moka cache so the
//! profile is fetched once per session and refreshed after edits; every
//! write that changes what `GET /client/{id}` returns invalidates the entry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use quitanda_core::ClientId;

use crate::config::PlatformConfig;

use super::PlatformError;
use super::types::{
    ClientProfile, ClientUpdate, CreditCard, Discount, LoginRequest, LoginResponse, NewCreditCard,
    NewOrder, OrderSummary, Product,
};

/// Profile cache TTL. Profiles change rarely and edits invalidate eagerly.
const PROFILE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the platform REST backend.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    http: reqwest::Client,
    api_url: String,
    upload_url: String,
    profile_cache: Cache<ClientId, ClientProfile>,
}

impl PlatformClient {
    /// Create a new platform API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        let profile_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(PROFILE_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(PlatformClientInner {
                http: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                upload_url: config.upload_url.clone(),
                profile_cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.api_url)
    }

    /// Read the response body as JSON, mapping failures to `Parse`.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlatformError> {
        response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))
    }

    /// Turn a non-success response into a `PlatformError`.
    async fn error_for(response: reqwest::Response) -> PlatformError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        match status {
            reqwest::StatusCode::NOT_FOUND => PlatformError::NotFound(message),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                PlatformError::InvalidCredentials
            }
            _ => PlatformError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for the client identity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the backend rejects the pair, or a
    /// transport/parse error otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Self::read_json(response).await
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Get a client profile (with stored cards) by ID.
    ///
    /// Cached; the first call per session hits the backend, later calls are
    /// served from memory until an edit invalidates the entry.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown IDs, or a transport/parse error.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(&self, client_id: ClientId) -> Result<ClientProfile, PlatformError> {
        if let Some(profile) = self.inner.profile_cache.get(&client_id).await {
            debug!("profile cache hit");
            return Ok(profile);
        }

        let response = self
            .inner
            .http
            .get(self.url(&format!("/client/{client_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let profile: ClientProfile = Self::read_json(response).await?;
        self.inner
            .profile_cache
            .insert(client_id, profile.clone())
            .await;
        Ok(profile)
    }

    /// Update a client profile.
    ///
    /// Invalidates the cached profile so the next read refreshes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when the gating password is rejected.
    #[instrument(skip(self, update), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        client_id: ClientId,
        update: &ClientUpdate,
    ) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .put(self.url(&format!("/client/{client_id}")))
            .json(update)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        self.inner.profile_cache.invalidate(&client_id).await;
        Ok(())
    }

    // =========================================================================
    // Cards
    // =========================================================================

    /// Store a new payment card for a client.
    ///
    /// Invalidates the profile cache so the card list refreshes on the next
    /// checkout render.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the card.
    #[instrument(skip(self, card), fields(client_id = %card.client_id))]
    pub async fn create_card(&self, card: &NewCreditCard) -> Result<CreditCard, PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("/card"))
            .json(card)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        self.inner.profile_cache.invalidate(&card.client_id).await;
        Self::read_json(response).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order. The caller decides
    /// what happens to the cart; this client never touches it.
    #[instrument(skip(self, order), fields(client_id = %order.client_id, lines = order.product_list.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<(), PlatformError> {
        let response = self
            .inner
            .http
            .post(self.url("/order"))
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }

    /// List a client's past orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a transport/parse error on failure.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn client_orders(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<OrderSummary>, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/order/client/{client_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Self::read_json(response).await
    }

    // =========================================================================
    // Products & discounts
    // =========================================================================

    /// List all products available for ordering.
    ///
    /// # Errors
    ///
    /// Returns a transport/parse error on failure.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, PlatformError> {
        let response = self.inner.http.get(self.url("/product")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Self::read_json(response).await
    }

    /// Get a single product by ID.
    ///
    /// Used by add-to-cart so the cart snapshots the backend's price, never
    /// one posted by the browser.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown IDs.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(
        &self,
        product_id: quitanda_core::ProductId,
    ) -> Result<Product, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/product/{product_id}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Self::read_json(response).await
    }

    /// Resolve a discount code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown codes.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn get_discount(&self, code: &str) -> Result<Discount, PlatformError> {
        let response = self
            .inner
            .http
            .get(self.url(&format!("/discount/{code}")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Self::read_json(response).await
    }

    // =========================================================================
    // Image upload
    // =========================================================================

    /// Forward a profile image to the platform upload endpoint.
    ///
    /// The upload endpoint is separate from the main API (historically a
    /// hardcoded local service) and takes a multipart body with the image
    /// and the owning client's ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload service rejects the file.
    #[instrument(skip(self, bytes), fields(client_id = %client_id, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        client_id: ClientId,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<(), PlatformError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| PlatformError::Parse(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("userId", client_id.to_string());

        let response = self
            .inner
            .http
            .post(&self.inner.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        self.inner.profile_cache.invalidate(&client_id).await;
        Ok(())
    }
}
