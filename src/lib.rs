//! # Limits SDK
//!
//! A Rust client for the Limits trading backend. It turns trading intents into
//! EIP-712 typed-data payloads, submits signed requests over HTTP, and
//! normalizes the backend's responses.
//!
//! ## Features
//!
//! - Fixed, ordered typed-data schemas for orders, batch orders, leverage
//!   changes and device registration
//! - Builder-fee and agent permits for the delegated signing service
//! - Batch result reconciliation that never loses a submitted order
//! - EIP-712 digest computation for checking what a signer signs
//! - Normalized transport errors with machine-checkable codes
//!
//! Keys never enter the SDK: signing goes through a [`TypedDataSigner`]
//! you provide.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use limits_sdk::{ClientConfig, LimitsClient, OrderRequest, SigningPayload, TypedDataSigner};
//!
//! struct Wallet;
//!
//! #[async_trait]
//! impl TypedDataSigner for Wallet {
//!     async fn sign_typed_data(&self, _payload: &SigningPayload) -> limits_sdk::Result<String> {
//!         // Hand `_payload.to_json()?` to your wallet and return its hex signature.
//!         unimplemented!()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Uses LIMITS_BASE_URL / LIMITS_TIMEOUT_MS env vars, or defaults
//!     let client = LimitsClient::new(ClientConfig::default())?;
//!
//!     let order = OrderRequest::market(
//!         "0x1234567890123456789012345678901234567890",
//!         "BTC",
//!         true,
//!         "0.1",
//!         1_700_000_000_000,
//!         42161,
//!     );
//!     let response = client.place_order(order, &Wallet).await?;
//!     println!("Order submitted: {}", response.message);
//!
//!     Ok(())
//! }
//! ```

// Internal modules
mod aggregate;
mod client;
mod eip712;
mod error;
mod http;
mod permit;
mod schema;
mod signer;
mod signing;
mod types;

// Re-export public API
pub use aggregate::{aggregate, BatchFailure, BatchResult, BatchSuccess, NO_RESULT_REPORTED};
pub use client::{ClientConfig, LimitsClient};
pub use eip712::{domain_separator, encode_type, hash_struct, keccak256, signing_hash, type_hash};
pub use error::{Result, SdkError, TransportError};
pub use http::HttpClient;
pub use permit::{
    agent_name, build_permit, wrap_for_signing, Permit, PermitAction, PermitKind, PermitRequest,
    PermitSubmission, AGENT_NAME, AGENT_VALIDITY_WINDOW_MS, DEFAULT_AGENT_ADDRESS,
    DEFAULT_BUILDER_ADDRESS, HYPERLIQUID_CHAIN, MAX_FEE_RATE,
};
pub use schema::{
    schema_for, DomainTemplate, FieldSpec, OperationKind, Schema, SemanticType, StructDef,
    TypeMap,
};
pub use signer::TypedDataSigner;
pub use signing::{
    build, build_payload, sign_request, SignableRequest, Signed, SigningDomain, SigningPayload,
};
pub use types::{
    // Order parameters
    Builder,
    Grouping,
    LimitOrder,
    OrderType,
    Tif,
    TriggerKind,
    TriggerOrder,
    // Signed requests
    BatchItem,
    BatchOrderRequest,
    LeverageRequest,
    OrderRequest,
    VerifyDeviceRequest,
    // Unsigned requests
    ConnectUserRequest,
    TwapRequest,
    VerifyCodeRequest,
    VerifyKeysRequest,
    // Responses
    ApiResponse,
    ConnectUserResponse,
    LeverageResponse,
    OrderResponse,
    TwapResponse,
    VerifyCodeResponse,
    VerifyDeviceResponse,
    VerifyKeysResponse,
    // Signature
    Signature,
    // Constants
    DEFAULT_BASE_URL,
    DEFAULT_PERMIT_ENDPOINT,
    DEFAULT_TIMEOUT_MS,
};
