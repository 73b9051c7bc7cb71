//! Delegated-authority permits (builder-fee approval, agent approval).
//!
//! Permits are signed against the permit service's own domain and carry the
//! `EIP712Domain` struct inline in their type map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Result, SdkError};
use crate::schema::{
    schema_for, OperationKind, StructDef, TypeMap, APPROVE_AGENT, APPROVE_BUILDER_FEE,
    PERMIT_DOMAIN_STRUCT,
};
use crate::signing::{is_hex_address, SigningDomain, SigningPayload};
use crate::types::Signature;

// =============================================================================
// Constants
// =============================================================================

pub const HYPERLIQUID_CHAIN: &str = "Mainnet";

/// Maximum builder fee the user approves.
pub const MAX_FEE_RATE: &str = "0.1%";

pub const DEFAULT_BUILDER_ADDRESS: &str = "0x6D4E3B1cB5C9aA6e1F0e2b0C4a6D3f8E9b7A1c25";
pub const DEFAULT_AGENT_ADDRESS: &str = "0x3F8aB6C2d9E14f7A0b5C8e2D6a1F4c9B7e0D3a58";
pub const AGENT_NAME: &str = "Limits";

/// Agent approvals expire 180 days after their nonce timestamp.
pub const AGENT_VALIDITY_WINDOW_MS: u64 = 15_552_000_000;

// =============================================================================
// Permit kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermitKind {
    ApproveBuilderFee,
    ApproveAgent,
}

impl PermitKind {
    pub fn operation(&self) -> OperationKind {
        match self {
            PermitKind::ApproveBuilderFee => OperationKind::ApproveBuilderFee,
            PermitKind::ApproveAgent => OperationKind::ApproveAgent,
        }
    }

    pub fn struct_def(&self) -> StructDef {
        match self {
            PermitKind::ApproveBuilderFee => APPROVE_BUILDER_FEE,
            PermitKind::ApproveAgent => APPROVE_AGENT,
        }
    }
}

impl fmt::Display for PermitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation().as_str())
    }
}

/// An unsigned permit: its type map and message, plus the inputs they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Permit {
    pub kind: PermitKind,
    pub nonce: u64,
    pub chain_id: u64,
    pub types: TypeMap,
    pub message: Map<String, Value>,
}

impl Permit {
    fn message_str(&self, field: &str) -> Result<String> {
        self.message
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SdkError::Validation {
                operation: self.kind.to_string(),
                fields: vec![field.to_string()],
                reason: format!("permit message has no '{}'", field),
            })
    }
}

/// Human-readable agent name embedding the expiry derived from `nonce`.
pub fn agent_name(nonce: u64) -> String {
    format!(
        "{} valid_until {}",
        AGENT_NAME,
        nonce.saturating_add(AGENT_VALIDITY_WINDOW_MS)
    )
}

/// Build the permit message and types for `kind`.
///
/// `delegate` overrides the default builder/agent address. Addresses are
/// lower-cased so the signed value compares canonically on the verifier side.
pub fn build_permit(
    kind: PermitKind,
    nonce: u64,
    chain_id: u64,
    delegate: Option<&str>,
) -> Result<Permit> {
    let (field, default) = match kind {
        PermitKind::ApproveBuilderFee => ("builder", DEFAULT_BUILDER_ADDRESS),
        PermitKind::ApproveAgent => ("agentAddress", DEFAULT_AGENT_ADDRESS),
    };
    let address = delegate.unwrap_or(default);
    if !is_hex_address(address) {
        return Err(SdkError::Validation {
            operation: kind.to_string(),
            fields: vec![field.to_string()],
            reason: format!("malformed field(s): {}", field),
        });
    }
    let address = address.to_lowercase();

    let mut message = Map::new();
    message.insert("hyperliquidChain".into(), Value::from(HYPERLIQUID_CHAIN));
    match kind {
        PermitKind::ApproveBuilderFee => {
            message.insert("maxFeeRate".into(), Value::from(MAX_FEE_RATE));
            message.insert("builder".into(), Value::from(address));
        }
        PermitKind::ApproveAgent => {
            message.insert("agentAddress".into(), Value::from(address));
            message.insert("agentName".into(), Value::from(agent_name(nonce)));
        }
    }
    message.insert("nonce".into(), Value::from(nonce));

    Ok(Permit {
        kind,
        nonce,
        chain_id,
        types: schema_for(kind.operation()).types(),
        message,
    })
}

/// Attach the permit domain and declare its root struct ahead of the
/// caller's structs.
pub fn wrap_for_signing(
    types: &TypeMap,
    message: &Map<String, Value>,
    chain_id: u64,
) -> SigningPayload {
    let primary_type = types
        .names()
        .into_iter()
        .find(|name| *name != PERMIT_DOMAIN_STRUCT.name)
        .unwrap_or_default()
        .to_string();

    let mut types = types.clone();
    types.prepend(PERMIT_DOMAIN_STRUCT);

    SigningPayload {
        domain: SigningDomain::permit(chain_id),
        types,
        primary_type,
        message: message.clone(),
    }
}

// =============================================================================
// Submission wire format
// =============================================================================

/// Permit action as the signing service expects it. Each variant carries
/// only its own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PermitAction {
    #[serde(rename_all = "camelCase")]
    ApproveBuilderFee {
        hyperliquid_chain: String,
        signature_chain_id: String,
        max_fee_rate: String,
        builder: String,
        nonce: u64,
    },
    #[serde(rename_all = "camelCase")]
    ApproveAgent {
        hyperliquid_chain: String,
        signature_chain_id: String,
        agent_address: String,
        agent_name: String,
        nonce: u64,
    },
}

impl PermitAction {
    pub fn from_permit(permit: &Permit, chain_id: u64) -> Result<Self> {
        let hyperliquid_chain = permit.message_str("hyperliquidChain")?;
        let signature_chain_id = format!("0x{:x}", chain_id);

        Ok(match permit.kind {
            PermitKind::ApproveBuilderFee => PermitAction::ApproveBuilderFee {
                hyperliquid_chain,
                signature_chain_id,
                max_fee_rate: permit.message_str("maxFeeRate")?,
                builder: permit.message_str("builder")?,
                nonce: permit.nonce,
            },
            PermitKind::ApproveAgent => PermitAction::ApproveAgent {
                hyperliquid_chain,
                signature_chain_id,
                agent_address: permit.message_str("agentAddress")?,
                agent_name: permit.message_str("agentName")?,
                nonce: permit.nonce,
            },
        })
    }
}

/// Body posted to the permit endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermitRequest {
    pub action: PermitAction,
    pub nonce: u64,
    pub signature: Signature,
}

impl PermitRequest {
    /// Decompose `signature` and pair it with the action for `permit`.
    pub fn new(permit: &Permit, signature: &str, chain_id: u64) -> Result<Self> {
        Ok(Self {
            action: PermitAction::from_permit(permit, chain_id)?,
            nonce: permit.nonce,
            signature: Signature::from_hex(signature)?,
        })
    }
}

/// Outcome of a permit submission. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PermitSubmission {
    Success { response: Value },
    Error { error: String },
}

impl PermitSubmission {
    pub fn is_success(&self) -> bool {
        matches!(self, PermitSubmission::Success { .. })
    }
}
