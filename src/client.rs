//! Main LimitsClient facade for the SDK.
//!
//! Provides a unified interface for all trading operations.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::aggregate::{aggregate, BatchResult};
use crate::error::{Result, SdkError};
use crate::http::HttpClient;
use crate::permit::{
    build_permit, wrap_for_signing, Permit, PermitKind, PermitRequest, PermitSubmission,
};
use crate::signer::TypedDataSigner;
use crate::signing::{sign_request, Signed};
use crate::types::{
    ApiResponse, BatchItem, BatchOrderRequest, ConnectUserRequest, ConnectUserResponse,
    LeverageRequest, LeverageResponse, OrderRequest, OrderResponse, TwapRequest, TwapResponse,
    VerifyCodeRequest, VerifyCodeResponse, VerifyDeviceRequest, VerifyDeviceResponse,
    VerifyKeysRequest, VerifyKeysResponse, DEFAULT_BASE_URL, DEFAULT_PERMIT_ENDPOINT,
    DEFAULT_TIMEOUT_MS,
};

/// Configuration for the Limits client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:3001/dmp")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
    /// Permit service endpoint (absolute URL)
    pub permit_endpoint: String,
    /// Overrides the default builder address in builder-fee permits
    pub builder_address: Option<String>,
    /// Overrides the default agent address in agent permits
    pub agent_address: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let timeout_ms = std::env::var("LIMITS_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            base_url: std::env::var("LIMITS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            headers: HashMap::new(),
            permit_endpoint: std::env::var("LIMITS_PERMIT_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_PERMIT_ENDPOINT.to_string()),
            builder_address: None,
            agent_address: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_permit_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.permit_endpoint = endpoint.into();
        self
    }

    pub fn with_builder_address(mut self, address: impl Into<String>) -> Self {
        self.builder_address = Some(address.into());
        self
    }

    pub fn with_agent_address(mut self, address: impl Into<String>) -> Self {
        self.agent_address = Some(address.into());
        self
    }
}

/// The main Limits SDK client.
///
/// Provides methods for:
/// - Submitting signed orders, batches, leverage changes and device registrations
/// - Building and submitting builder-fee and agent permits
/// - Account connection and verification
pub struct LimitsClient {
    http: HttpClient,
    config: ClientConfig,
}

impl LimitsClient {
    /// Create a new LimitsClient with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(&config.base_url, config.timeout, &config.headers)?;

        info!("LimitsClient initialized for {}", http.base_url());

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Signed trading operations
    // =========================================================================

    /// Submit a signed single order.
    pub async fn create_order(&self, order: &Signed<OrderRequest>) -> Result<OrderResponse> {
        info!(
            "Placing {} order on {} (nonce {})",
            if order.request.is_buy { "buy" } else { "sell" },
            order.request.coin,
            order.request.nonce
        );
        self.http.post("/order", order).await
    }

    /// Submit a signed batch and reconcile the per-item outcomes against the
    /// submitted order list.
    pub async fn create_batch_orders(
        &self,
        batch: &Signed<BatchOrderRequest>,
    ) -> Result<BatchResult<BatchItem>> {
        info!(
            "Placing batch of {} orders (nonce {})",
            batch.request.orders.len(),
            batch.request.nonce
        );
        let response: ApiResponse<Value> = self.http.post("/batchOrder", batch).await?;
        let result = aggregate(&batch.request.orders, &response);

        if result.failed > 0 {
            warn!("{}/{} batch orders failed", result.failed, result.total);
        }
        Ok(result)
    }

    /// Submit a signed leverage change.
    pub async fn update_leverage(
        &self,
        request: &Signed<LeverageRequest>,
    ) -> Result<LeverageResponse> {
        info!(
            "Updating {} leverage to {}x ({})",
            request.request.coin,
            request.request.leverage,
            if request.request.is_cross { "cross" } else { "isolated" }
        );
        self.http.post("/leverage", request).await
    }

    /// Submit a signed device/agent registration.
    pub async fn verify_device(
        &self,
        request: &Signed<VerifyDeviceRequest>,
    ) -> Result<VerifyDeviceResponse> {
        let response: ApiResponse<VerifyDeviceResponse> =
            self.http.post("/verifyDevice", request).await?;
        unwrap_data(response, "/verifyDevice")
    }

    // =========================================================================
    // Build, sign and submit in one call
    // =========================================================================

    pub async fn place_order<S: TypedDataSigner + ?Sized>(
        &self,
        order: OrderRequest,
        signer: &S,
    ) -> Result<OrderResponse> {
        let signed = sign_request(order, signer).await?;
        self.create_order(&signed).await
    }

    pub async fn place_batch_orders<S: TypedDataSigner + ?Sized>(
        &self,
        batch: BatchOrderRequest,
        signer: &S,
    ) -> Result<BatchResult<BatchItem>> {
        let signed = sign_request(batch, signer).await?;
        self.create_batch_orders(&signed).await
    }

    pub async fn set_leverage<S: TypedDataSigner + ?Sized>(
        &self,
        request: LeverageRequest,
        signer: &S,
    ) -> Result<LeverageResponse> {
        let signed = sign_request(request, signer).await?;
        self.update_leverage(&signed).await
    }

    pub async fn register_device<S: TypedDataSigner + ?Sized>(
        &self,
        request: VerifyDeviceRequest,
        signer: &S,
    ) -> Result<VerifyDeviceResponse> {
        let signed = sign_request(request, signer).await?;
        self.verify_device(&signed).await
    }

    // =========================================================================
    // Unsigned operations
    // =========================================================================

    /// Create a TWAP order.
    pub async fn create_twap_order(&self, request: &TwapRequest) -> Result<TwapResponse> {
        info!(
            "Creating TWAP for {} {} over {} min",
            request.size, request.token, request.runtime
        );
        self.http.post("/twap", request).await
    }

    /// Connect a user to the platform.
    pub async fn connect_user(&self, request: &ConnectUserRequest) -> Result<ConnectUserResponse> {
        let response: ApiResponse<ConnectUserResponse> = self.http.post("/connect", request).await?;
        unwrap_data(response, "/connect")
    }

    /// Verify a user's registered keys.
    pub async fn verify_keys(&self, request: &VerifyKeysRequest) -> Result<VerifyKeysResponse> {
        let response: ApiResponse<VerifyKeysResponse> = self.http.put("/connect", request).await?;
        unwrap_data(response, "/connect")
    }

    /// Verify an invite code.
    pub async fn verify_code(&self, request: &VerifyCodeRequest) -> Result<VerifyCodeResponse> {
        let response: ApiResponse<VerifyCodeResponse> =
            self.http.post("/verifyCode", request).await?;
        unwrap_data(response, "/verifyCode")
    }

    // =========================================================================
    // Permits
    // =========================================================================

    /// Build an unsigned permit, applying any configured delegate override.
    pub fn build_permit(&self, kind: PermitKind, nonce: u64, chain_id: u64) -> Result<Permit> {
        let delegate = match kind {
            PermitKind::ApproveBuilderFee => self.config.builder_address.as_deref(),
            PermitKind::ApproveAgent => self.config.agent_address.as_deref(),
        };
        build_permit(kind, nonce, chain_id, delegate)
    }

    /// Submit a signed permit to the permit service.
    ///
    /// Never fails: malformed signatures, transport errors and undecodable
    /// responses come back as [`PermitSubmission::Error`].
    pub async fn submit_permit(
        &self,
        permit: &Permit,
        signature: &str,
        chain_id: u64,
    ) -> PermitSubmission {
        let request = match PermitRequest::new(permit, signature, chain_id) {
            Ok(request) => request,
            Err(e) => return PermitSubmission::Error { error: e.to_string() },
        };

        info!("Submitting {} permit (nonce {})", permit.kind, permit.nonce);

        match self
            .http
            .post_url::<Value, _>(&self.config.permit_endpoint, &request)
            .await
        {
            Ok(response) => PermitSubmission::Success { response },
            Err(e) => {
                warn!("{} permit submission failed: {}", permit.kind, e);
                PermitSubmission::Error { error: e.to_string() }
            }
        }
    }

    /// Approve the configured builder fee: build, sign, submit.
    pub async fn approve_builder_fee<S: TypedDataSigner + ?Sized>(
        &self,
        nonce: u64,
        chain_id: u64,
        signer: &S,
    ) -> PermitSubmission {
        self.sign_and_submit_permit(PermitKind::ApproveBuilderFee, nonce, chain_id, signer)
            .await
    }

    /// Approve the configured agent: build, sign, submit.
    pub async fn approve_agent<S: TypedDataSigner + ?Sized>(
        &self,
        nonce: u64,
        chain_id: u64,
        signer: &S,
    ) -> PermitSubmission {
        self.sign_and_submit_permit(PermitKind::ApproveAgent, nonce, chain_id, signer)
            .await
    }

    async fn sign_and_submit_permit<S: TypedDataSigner + ?Sized>(
        &self,
        kind: PermitKind,
        nonce: u64,
        chain_id: u64,
        signer: &S,
    ) -> PermitSubmission {
        let permit = match self.build_permit(kind, nonce, chain_id) {
            Ok(permit) => permit,
            Err(e) => return PermitSubmission::Error { error: e.to_string() },
        };
        let payload = wrap_for_signing(&permit.types, &permit.message, chain_id);
        let signature = match signer.sign_typed_data(&payload).await {
            Ok(signature) => signature,
            Err(e) => return PermitSubmission::Error { error: e.to_string() },
        };
        self.submit_permit(&permit, &signature, chain_id).await
    }
}

/// Unwrap `data` from a backend envelope, failing if it is absent.
fn unwrap_data<T>(response: ApiResponse<T>, path: &str) -> Result<T> {
    match response.data {
        Some(data) => Ok(data),
        None => Err(SdkError::Serialization(format!(
            "{} response has no data: {}",
            path,
            response.error.unwrap_or(response.message)
        ))),
    }
}
