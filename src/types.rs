use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Order parameters (unsigned, forwarded as-is)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tif {
    Alo,
    Ioc,
    Gtc,
    FrontendMarket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Tp,
    Sl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub tif: Tif,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOrder {
    pub trigger_px: String,
    pub is_market: bool,
    pub tpsl: TriggerKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<LimitOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerOrder>,
}

impl OrderType {
    pub fn limit(tif: Tif) -> Self {
        Self {
            limit: Some(LimitOrder { tif }),
            trigger: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    Na,
    NormalTpsl,
    PositionTpsl,
}

/// Builder fee attribution attached to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Builder {
    pub address: String,
    pub fee: u64,
}

// =============================================================================
// Signed requests
// =============================================================================

/// A single order.
///
/// The signature covers `userAddress`, `coin`, `nonce`, `isBuy` and
/// `reduceOnly`; every other field rides alongside unsigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_address: String,
    pub coin: String,
    pub is_buy: bool,
    pub size: String,
    pub reduce_only: bool,
    pub nonce: u64,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<Grouping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<Builder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl OrderRequest {
    /// A market order with only the required fields set.
    pub fn market(
        user_address: impl Into<String>,
        coin: impl Into<String>,
        is_buy: bool,
        size: impl Into<String>,
        nonce: u64,
        chain_id: u64,
    ) -> Self {
        Self {
            user_address: user_address.into(),
            coin: coin.into(),
            is_buy,
            size: size.into(),
            reduce_only: false,
            nonce,
            chain_id,
            order_id: None,
            limit_price: None,
            order_type: None,
            client_order_id: None,
            grouping: None,
            builder: None,
            threshold: None,
        }
    }
}

/// One element of a batch. Only `coin`, `isBuy` and `reduceOnly` are signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub coin: String,
    pub is_buy: bool,
    pub size: String,
    pub reduce_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
}

/// A batch of orders covered by one signature over the batch envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOrderRequest {
    pub user_address: String,
    pub nonce: u64,
    pub chain_id: u64,
    pub orders: Vec<BatchItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageRequest {
    pub user_address: String,
    pub coin: String,
    pub leverage: u64,
    pub is_cross: bool,
    pub nonce: u64,
    pub chain_id: u64,
}

/// Registers a device/agent key against a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDeviceRequest {
    pub user_address: String,
    pub agent_address: String,
    pub nonce: u64,
    pub chain_id: u64,
}

// =============================================================================
// Unsigned requests
// =============================================================================

/// Time-weighted order. Frequency and runtime are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwapRequest {
    pub user_address: String,
    pub token: String,
    pub size: String,
    pub frequency: String,
    pub runtime: String,
    pub randomize: bool,
    pub is_buy: bool,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectUserRequest {
    pub user_address: String,
    pub device_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKeysRequest {
    pub user_address: String,
    pub agent_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub user_address: String,
    pub invite_code: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Envelope every backend endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type OrderResponse = ApiResponse<Value>;
pub type LeverageResponse = ApiResponse<Value>;
pub type TwapResponse = ApiResponse<Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectUserResponse {
    pub user_address: String,
    #[serde(default)]
    pub hype_public_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDeviceResponse {
    pub verified: bool,
    pub user_address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKeysResponse {
    pub verified: bool,
    pub user_address: String,
    #[serde(default)]
    pub message: String,
}

pub type VerifyCodeResponse = VerifyKeysResponse;

// =============================================================================
// Signature components
// =============================================================================

/// The three canonical components of a secp256k1 signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: String,
    pub s: String,
    pub v: u8,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:02x}", self.r, self.s.trim_start_matches("0x"), self.v)
    }
}

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/dmp";
pub const DEFAULT_PERMIT_ENDPOINT: &str = "https://api.hyperliquid.xyz/exchange";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
