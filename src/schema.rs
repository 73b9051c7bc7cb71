//! Schema registry: the fixed typed-data layout for every signed operation.
//!
//! Field order inside each struct is part of the hash layout a verifier
//! reproduces. Never reorder entries here without a matching backend change.

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SdkError;

// =============================================================================
// Domains
// =============================================================================

pub const TRADING_DOMAIN_NAME: &str = "Limits";
pub const TRADING_DOMAIN_VERSION: &str = "1";

pub const PERMIT_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
pub const PERMIT_DOMAIN_VERSION: &str = "1";
pub const PERMIT_VERIFYING_CONTRACT: &str = "0x0000000000000000000000000000000000000000";

/// Which signing domain an operation is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainTemplate {
    /// The trading backend's own domain (no verifying contract).
    Trading,
    /// The delegated-permit service domain.
    PermitService,
}

// =============================================================================
// Semantic types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    String,
    Bool,
    Address,
    Uint64,
    Uint256,
    Bytes32,
    Struct(&'static str),
    StructArray(&'static str),
}

impl SemanticType {
    /// Name of the referenced struct, if this type points at one.
    pub fn struct_ref(&self) -> Option<&'static str> {
        match self {
            SemanticType::Struct(name) | SemanticType::StructArray(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::String => write!(f, "string"),
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::Address => write!(f, "address"),
            SemanticType::Uint64 => write!(f, "uint64"),
            SemanticType::Uint256 => write!(f, "uint256"),
            SemanticType::Bytes32 => write!(f, "bytes32"),
            SemanticType::Struct(name) => write!(f, "{}", name),
            SemanticType::StructArray(name) => write!(f, "{}[]", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: SemanticType,
}

impl Serialize for FieldSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldSpec", 2)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("type", &self.ty.to_string())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructDef {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl StructDef {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// Ordered struct-name -> field-list map, serialized as a JSON object in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap(Vec<StructDef>);

impl TypeMap {
    pub fn new(structs: &[StructDef]) -> Self {
        Self(structs.to_vec())
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.0.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|s| s.name).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert a struct ahead of everything already present.
    pub fn prepend(&mut self, def: StructDef) {
        self.0.retain(|s| s.name != def.name);
        self.0.insert(0, def);
    }
}

impl Serialize for TypeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for def in &self.0 {
            map.serialize_entry(def.name, def.fields)?;
        }
        map.end()
    }
}

// =============================================================================
// Operation kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateOrder,
    CreateOrders,
    UpdateLeverage,
    VerifyDevice,
    ApproveBuilderFee,
    ApproveAgent,
}

impl OperationKind {
    pub const ALL: [OperationKind; 6] = [
        OperationKind::CreateOrder,
        OperationKind::CreateOrders,
        OperationKind::UpdateLeverage,
        OperationKind::VerifyDevice,
        OperationKind::ApproveBuilderFee,
        OperationKind::ApproveAgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreateOrder => "createOrder",
            OperationKind::CreateOrders => "createOrders",
            OperationKind::UpdateLeverage => "updateLeverage",
            OperationKind::VerifyDevice => "verifyDevice",
            OperationKind::ApproveBuilderFee => "approveBuilderFee",
            OperationKind::ApproveAgent => "approveAgent",
        }
    }

    pub fn is_permit(&self) -> bool {
        matches!(
            self,
            OperationKind::ApproveBuilderFee | OperationKind::ApproveAgent
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SdkError::UnsupportedOperation(s.to_string()))
    }
}

// =============================================================================
// Struct definitions
// =============================================================================

const fn field(name: &'static str, ty: SemanticType) -> FieldSpec {
    FieldSpec { name, ty }
}

pub const VERIFY_ORDER: StructDef = StructDef {
    name: "VerifyOrder",
    fields: &[
        field("userAddress", SemanticType::String),
        field("coin", SemanticType::String),
        field("nonce", SemanticType::Uint64),
        field("isBuy", SemanticType::Bool),
        field("reduceOnly", SemanticType::Bool),
    ],
};

pub const ORDER_DETAILS: StructDef = StructDef {
    name: "OrderDetails",
    fields: &[
        field("coin", SemanticType::String),
        field("isBuy", SemanticType::Bool),
        field("reduceOnly", SemanticType::Bool),
    ],
};

pub const VERIFY_ORDERS: StructDef = StructDef {
    name: "VerifyOrders",
    fields: &[
        field("userAddress", SemanticType::String),
        field("nonce", SemanticType::Uint64),
        field("orders", SemanticType::StructArray("OrderDetails")),
    ],
};

pub const VERIFY_LEVERAGE: StructDef = StructDef {
    name: "VerifyLeverage",
    fields: &[
        field("userAddress", SemanticType::String),
        field("coin", SemanticType::String),
        field("nonce", SemanticType::Uint64),
        field("leverage", SemanticType::Uint64),
        field("isCross", SemanticType::Bool),
    ],
};

pub const VERIFY_DEVICE: StructDef = StructDef {
    name: "VerifyDevice",
    fields: &[
        field("userAddress", SemanticType::String),
        field("agentAddress", SemanticType::String),
        field("nonce", SemanticType::Uint64),
    ],
};

pub const APPROVE_BUILDER_FEE: StructDef = StructDef {
    name: "HyperliquidTransaction:ApproveBuilderFee",
    fields: &[
        field("hyperliquidChain", SemanticType::String),
        field("maxFeeRate", SemanticType::String),
        field("builder", SemanticType::Address),
        field("nonce", SemanticType::Uint64),
    ],
};

pub const APPROVE_AGENT: StructDef = StructDef {
    name: "HyperliquidTransaction:ApproveAgent",
    fields: &[
        field("hyperliquidChain", SemanticType::String),
        field("agentAddress", SemanticType::Address),
        field("agentName", SemanticType::String),
        field("nonce", SemanticType::Uint64),
    ],
};

/// Root struct the permit verifier expects declared next to the payload.
pub const PERMIT_DOMAIN_STRUCT: StructDef = StructDef {
    name: "EIP712Domain",
    fields: &[
        field("name", SemanticType::String),
        field("version", SemanticType::String),
        field("chainId", SemanticType::Uint256),
        field("verifyingContract", SemanticType::Address),
    ],
};

// =============================================================================
// Registry
// =============================================================================

/// Registered schema for one operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub domain: DomainTemplate,
    pub primary_type: &'static str,
    pub structs: &'static [StructDef],
}

impl Schema {
    pub fn primary(&self) -> &'static StructDef {
        // primary_type is always one of structs; see registry tests
        let structs: &'static [StructDef] = self.structs;
        structs
            .iter()
            .find(|s| s.name == self.primary_type)
            .unwrap_or(&structs[0])
    }

    pub fn types(&self) -> TypeMap {
        TypeMap::new(self.structs)
    }
}

const CREATE_ORDER_SCHEMA: Schema = Schema {
    domain: DomainTemplate::Trading,
    primary_type: "VerifyOrder",
    structs: &[VERIFY_ORDER],
};

const CREATE_ORDERS_SCHEMA: Schema = Schema {
    domain: DomainTemplate::Trading,
    primary_type: "VerifyOrders",
    structs: &[ORDER_DETAILS, VERIFY_ORDERS],
};

const UPDATE_LEVERAGE_SCHEMA: Schema = Schema {
    domain: DomainTemplate::Trading,
    primary_type: "VerifyLeverage",
    structs: &[VERIFY_LEVERAGE],
};

const VERIFY_DEVICE_SCHEMA: Schema = Schema {
    domain: DomainTemplate::Trading,
    primary_type: "VerifyDevice",
    structs: &[VERIFY_DEVICE],
};

const APPROVE_BUILDER_FEE_SCHEMA: Schema = Schema {
    domain: DomainTemplate::PermitService,
    primary_type: "HyperliquidTransaction:ApproveBuilderFee",
    structs: &[APPROVE_BUILDER_FEE],
};

const APPROVE_AGENT_SCHEMA: Schema = Schema {
    domain: DomainTemplate::PermitService,
    primary_type: "HyperliquidTransaction:ApproveAgent",
    structs: &[APPROVE_AGENT],
};

/// Look up the schema for an operation kind.
pub fn schema_for(kind: OperationKind) -> &'static Schema {
    match kind {
        OperationKind::CreateOrder => &CREATE_ORDER_SCHEMA,
        OperationKind::CreateOrders => &CREATE_ORDERS_SCHEMA,
        OperationKind::UpdateLeverage => &UPDATE_LEVERAGE_SCHEMA,
        OperationKind::VerifyDevice => &VERIFY_DEVICE_SCHEMA,
        OperationKind::ApproveBuilderFee => &APPROVE_BUILDER_FEE_SCHEMA,
        OperationKind::ApproveAgent => &APPROVE_AGENT_SCHEMA,
    }
}
