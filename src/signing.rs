//! Typed-data payload building for every signed operation.
//!
//! The message is always assembled by walking the registered schema, so the
//! emitted field order is the schema's order and caller-supplied extras never
//! leak into what gets signed.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::eip712;
use crate::error::{Result, SdkError};
use crate::permit::{self, PermitKind};
use crate::schema::{
    schema_for, DomainTemplate, FieldSpec, OperationKind, SemanticType, StructDef, TypeMap,
    PERMIT_DOMAIN_NAME, PERMIT_DOMAIN_STRUCT, PERMIT_DOMAIN_VERSION, PERMIT_VERIFYING_CONTRACT,
    TRADING_DOMAIN_NAME, TRADING_DOMAIN_VERSION,
};
use crate::signer::TypedDataSigner;
use crate::types::{
    BatchOrderRequest, LeverageRequest, OrderRequest, Signature, VerifyDeviceRequest,
};

/// Old spellings the backend no longer accepts, with their replacements.
const DEPRECATED_FIELDS: &[(&str, &str)] = &[
    ("is_buy", "isBuy"),
    ("reduce_only", "reduceOnly"),
    ("sz", "size"),
    ("limit_px", "limitPrice"),
    ("leverageType", "isCross"),
    ("user_address", "userAddress"),
];

// =============================================================================
// Domain and payload
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
}

/// Trading domain has no verifying contract, so its root struct stops at chainId.
const TRADING_DOMAIN_STRUCT: StructDef = StructDef {
    name: "EIP712Domain",
    fields: &[
        FieldSpec {
            name: "name",
            ty: SemanticType::String,
        },
        FieldSpec {
            name: "version",
            ty: SemanticType::String,
        },
        FieldSpec {
            name: "chainId",
            ty: SemanticType::Uint256,
        },
    ],
};

impl SigningDomain {
    pub fn trading(chain_id: u64) -> Self {
        Self {
            name: TRADING_DOMAIN_NAME.to_string(),
            version: TRADING_DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract: None,
        }
    }

    pub fn permit(chain_id: u64) -> Self {
        Self {
            name: PERMIT_DOMAIN_NAME.to_string(),
            version: PERMIT_DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract: Some(PERMIT_VERIFYING_CONTRACT.to_string()),
        }
    }

    pub fn for_template(template: DomainTemplate, chain_id: u64) -> Self {
        match template {
            DomainTemplate::Trading => Self::trading(chain_id),
            DomainTemplate::PermitService => Self::permit(chain_id),
        }
    }

    /// The `EIP712Domain` struct matching the fields this domain carries.
    pub fn struct_def(&self) -> StructDef {
        if self.verifying_contract.is_some() {
            PERMIT_DOMAIN_STRUCT
        } else {
            TRADING_DOMAIN_STRUCT
        }
    }

    /// Domain fields as a typed-data message, in `struct_def` order.
    pub fn to_message(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), Value::from(self.name.clone()));
        map.insert("version".into(), Value::from(self.version.clone()));
        map.insert("chainId".into(), Value::from(self.chain_id));
        if let Some(contract) = &self.verifying_contract {
            map.insert("verifyingContract".into(), Value::from(contract.clone()));
        }
        map
    }
}

/// Everything an external signer needs: `{domain, types, primaryType, message}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningPayload {
    pub domain: SigningDomain,
    pub types: TypeMap,
    pub primary_type: String,
    pub message: Map<String, Value>,
}

impl SigningPayload {
    /// Field list of the primary struct.
    pub fn primary_fields(&self) -> Option<Vec<&'static str>> {
        self.types.get(&self.primary_type).map(|def| def.field_names())
    }

    /// The 32-byte digest an EIP-712 signer signs for this payload.
    pub fn signing_hash(&self) -> Result<[u8; 32]> {
        eip712::signing_hash(self)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Build the signing payload for an operation given as a string, e.g. from
/// a config file or another process.
pub fn build_payload(kind: &str, request: &Value) -> Result<SigningPayload> {
    let kind: OperationKind = kind.parse()?;
    build(kind, request)
}

/// Build the signing payload for `kind` from a JSON request object.
pub fn build(kind: OperationKind, request: &Value) -> Result<SigningPayload> {
    let payload = match kind {
        OperationKind::CreateOrder
        | OperationKind::CreateOrders
        | OperationKind::UpdateLeverage
        | OperationKind::VerifyDevice => build_trading(kind, request)?,
        OperationKind::ApproveBuilderFee => {
            build_permit_payload(PermitKind::ApproveBuilderFee, request)?
        }
        OperationKind::ApproveAgent => build_permit_payload(PermitKind::ApproveAgent, request)?,
    };

    debug!(
        "Built {} payload with primary type {}",
        kind, payload.primary_type
    );
    Ok(payload)
}

fn build_trading(kind: OperationKind, request: &Value) -> Result<SigningPayload> {
    let schema = schema_for(kind);
    let mut checker = FieldChecker::new(kind);

    let Some(obj) = request.as_object() else {
        return Err(checker.not_an_object());
    };

    checker.reject_deprecated(obj, "");
    let chain_id = checker.require_u64(obj, "chainId", "");
    let types = schema.types();
    let message = checker.extract_struct(schema.primary(), &types, obj, "");
    checker.finish()?;

    Ok(SigningPayload {
        domain: SigningDomain::for_template(schema.domain, chain_id.unwrap_or_default()),
        types,
        primary_type: schema.primary_type.to_string(),
        message,
    })
}

fn build_permit_payload(kind: PermitKind, request: &Value) -> Result<SigningPayload> {
    let mut checker = FieldChecker::new(kind.operation());

    let Some(obj) = request.as_object() else {
        return Err(checker.not_an_object());
    };

    let nonce = checker.require_u64(obj, "nonce", "");
    let chain_id = checker.require_u64(obj, "chainId", "");
    let (key, other) = match kind {
        PermitKind::ApproveBuilderFee => ("builder", "agentAddress"),
        PermitKind::ApproveAgent => ("agentAddress", "builder"),
    };
    if obj.contains_key(other) {
        checker.unexpected.push(other.to_string());
    }
    let delegate = match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            checker.malformed.push(key.to_string());
            None
        }
    };
    checker.finish()?;

    let nonce = nonce.unwrap_or_default();
    let chain_id = chain_id.unwrap_or_default();
    let permit = permit::build_permit(kind, nonce, chain_id, delegate)?;
    Ok(permit::wrap_for_signing(&permit.types, &permit.message, chain_id))
}

// =============================================================================
// Field validation
// =============================================================================

/// Collects every missing or malformed field before failing, so a caller sees
/// the whole problem in one error.
struct FieldChecker {
    kind: OperationKind,
    missing: Vec<String>,
    malformed: Vec<String>,
    deprecated: Vec<String>,
    unexpected: Vec<String>,
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl FieldChecker {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            missing: Vec::new(),
            malformed: Vec::new(),
            deprecated: Vec::new(),
            unexpected: Vec::new(),
        }
    }

    fn not_an_object(&self) -> SdkError {
        SdkError::Validation {
            operation: self.kind.to_string(),
            fields: Vec::new(),
            reason: "request must be a JSON object".to_string(),
        }
    }

    fn reject_deprecated(&mut self, obj: &Map<String, Value>, prefix: &str) {
        for (old, new) in DEPRECATED_FIELDS {
            if obj.contains_key(*old) {
                self.deprecated
                    .push(format!("{} (use '{}')", join_path(prefix, old), new));
            }
        }
    }

    fn require_u64(&mut self, obj: &Map<String, Value>, name: &str, prefix: &str) -> Option<u64> {
        match obj.get(name) {
            None | Some(Value::Null) => {
                self.missing.push(join_path(prefix, name));
                None
            }
            Some(value) => {
                let parsed = value.as_u64();
                if parsed.is_none() {
                    self.malformed.push(join_path(prefix, name));
                }
                parsed
            }
        }
    }

    /// Copy the fields of `def` out of `obj` in schema order, recursing into
    /// nested structs and struct arrays.
    fn extract_struct(
        &mut self,
        def: &StructDef,
        types: &TypeMap,
        obj: &Map<String, Value>,
        prefix: &str,
    ) -> Map<String, Value> {
        let mut out = Map::new();
        for field in def.fields {
            let path = join_path(prefix, field.name);
            let value = match obj.get(field.name) {
                None | Some(Value::Null) => {
                    self.missing.push(path);
                    continue;
                }
                Some(value) => value,
            };
            if let Some(checked) = self.check_value(field.ty, value, types, &path) {
                out.insert(field.name.to_string(), checked);
            }
        }
        out
    }

    fn check_value(
        &mut self,
        ty: SemanticType,
        value: &Value,
        types: &TypeMap,
        path: &str,
    ) -> Option<Value> {
        let ok = match ty {
            SemanticType::String => value.is_string(),
            SemanticType::Bool => value.is_boolean(),
            SemanticType::Uint64 => value.as_u64().is_some(),
            SemanticType::Uint256 => eip712::parse_uint256(value).is_ok(),
            SemanticType::Address => value.as_str().map(is_hex_address).unwrap_or(false),
            SemanticType::Bytes32 => value
                .as_str()
                .map(|s| is_hex_of_len(s, 32))
                .unwrap_or(false),
            SemanticType::Struct(name) => {
                let (Some(def), Some(inner)) = (types.get(name), value.as_object()) else {
                    self.malformed.push(path.to_string());
                    return None;
                };
                self.reject_deprecated(inner, path);
                return Some(Value::Object(self.extract_struct(def, types, inner, path)));
            }
            SemanticType::StructArray(name) => {
                let (Some(def), Some(items)) = (types.get(name), value.as_array()) else {
                    self.malformed.push(path.to_string());
                    return None;
                };
                if items.is_empty() {
                    self.malformed.push(format!("{} (must not be empty)", path));
                    return None;
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    let Some(inner) = item.as_object() else {
                        self.malformed.push(item_path);
                        continue;
                    };
                    self.reject_deprecated(inner, &item_path);
                    out.push(Value::Object(self.extract_struct(def, types, inner, &item_path)));
                }
                return Some(Value::Array(out));
            }
        };

        if ok {
            Some(value.clone())
        } else {
            self.malformed.push(path.to_string());
            None
        }
    }

    fn finish(self) -> Result<()> {
        if self.missing.is_empty()
            && self.malformed.is_empty()
            && self.deprecated.is_empty()
            && self.unexpected.is_empty()
        {
            return Ok(());
        }

        let mut reasons = Vec::new();
        if !self.missing.is_empty() {
            reasons.push(format!("missing required field(s): {}", self.missing.join(", ")));
        }
        if !self.malformed.is_empty() {
            reasons.push(format!("malformed field(s): {}", self.malformed.join(", ")));
        }
        if !self.deprecated.is_empty() {
            reasons.push(format!("deprecated field(s): {}", self.deprecated.join(", ")));
        }
        if !self.unexpected.is_empty() {
            reasons.push(format!(
                "field(s) not accepted for {}: {}",
                self.kind,
                self.unexpected.join(", ")
            ));
        }

        let fields = self
            .missing
            .into_iter()
            .chain(self.malformed)
            .chain(self.deprecated)
            .chain(self.unexpected)
            .collect();

        Err(SdkError::Validation {
            operation: self.kind.to_string(),
            fields,
            reason: reasons.join("; "),
        })
    }
}

pub(crate) fn is_hex_address(s: &str) -> bool {
    is_hex_of_len(s, 20)
}

fn is_hex_of_len(s: &str, bytes: usize) -> bool {
    s.strip_prefix("0x")
        .map(|h| h.len() == bytes * 2 && h.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

// =============================================================================
// Signatures and signed requests
// =============================================================================

impl Signature {
    /// Split a 65-byte `r ‖ s ‖ v` hex signature into its components.
    /// `v` is normalized to 27/28.
    pub fn from_hex(signature: &str) -> Result<Self> {
        let raw = signature.strip_prefix("0x").unwrap_or(signature);
        let bytes = hex::decode(raw)
            .map_err(|e| SdkError::Signing(format!("Invalid signature hex: {}", e)))?;
        if bytes.len() != 65 {
            return Err(SdkError::Signing(format!(
                "Signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }

        let v = match bytes[64] {
            v @ (0 | 1) => v + 27,
            v @ (27 | 28) => v,
            other => {
                return Err(SdkError::Signing(format!(
                    "Invalid recovery id: {}",
                    other
                )))
            }
        };

        Ok(Signature {
            r: format!("0x{}", hex::encode(&bytes[..32])),
            s: format!("0x{}", hex::encode(&bytes[32..64])),
            v,
        })
    }
}

/// A request type that has a registered signing schema.
pub trait SignableRequest: Serialize {
    const KIND: OperationKind;

    fn signing_payload(&self) -> Result<SigningPayload> {
        build(Self::KIND, &serde_json::to_value(self)?)
    }
}

impl SignableRequest for OrderRequest {
    const KIND: OperationKind = OperationKind::CreateOrder;
}

impl SignableRequest for BatchOrderRequest {
    const KIND: OperationKind = OperationKind::CreateOrders;
}

impl SignableRequest for LeverageRequest {
    const KIND: OperationKind = OperationKind::UpdateLeverage;
}

impl SignableRequest for VerifyDeviceRequest {
    const KIND: OperationKind = OperationKind::VerifyDevice;
}

/// The original request with the signature components attached; this is
/// the exact body the backend receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signed<R> {
    #[serde(flatten)]
    pub request: R,
    #[serde(flatten)]
    pub signature: Signature,
}

impl<R: Serialize> Signed<R> {
    pub fn new(request: R, signature: Signature) -> Self {
        Self { request, signature }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SdkError::Serialization(e.to_string()))
    }
}

/// Build the payload for `request`, have `signer` sign it, and attach the result.
pub async fn sign_request<R, S>(request: R, signer: &S) -> Result<Signed<R>>
where
    R: SignableRequest + Send + Sync,
    S: TypedDataSigner + ?Sized,
{
    let payload = request.signing_payload()?;
    let raw = signer.sign_typed_data(&payload).await?;
    let signature = Signature::from_hex(&raw)?;
    debug!("Signed {} with v={}", R::KIND, signature.v);
    Ok(Signed::new(request, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_request() -> Value {
        json!({
            "reduceOnly": false,
            "isBuy": true,
            "coin": "BTC",
            "size": "0.1",
            "nonce": 123456,
            "userAddress": "0x1234567890123456789012345678901234567890",
            "chainId": 1
        })
    }

    fn batch_request() -> Value {
        json!({
            "userAddress": "0xabc",
            "nonce": 42,
            "chainId": 42161,
            "orders": [
                {"coin": "BTC", "isBuy": true, "reduceOnly": false, "size": "0.1"},
                {"coin": "ETH", "isBuy": true, "reduceOnly": false, "size": "2", "clientOrderId": "c-1"},
                {"coin": "SOL", "isBuy": false, "reduceOnly": true, "size": "10"}
            ]
        })
    }

    fn valid_request(kind: OperationKind) -> Value {
        match kind {
            OperationKind::CreateOrder => order_request(),
            OperationKind::CreateOrders => batch_request(),
            OperationKind::UpdateLeverage => json!({
                "userAddress": "0x123", "coin": "BTC", "nonce": 789,
                "leverage": 10, "isCross": true, "chainId": 1
            }),
            OperationKind::VerifyDevice => json!({
                "userAddress": "0x123", "agentAddress": "0x456", "nonce": 789, "chainId": 1
            }),
            OperationKind::ApproveBuilderFee | OperationKind::ApproveAgent => {
                json!({"nonce": 1000, "chainId": 1})
            }
        }
    }

    #[test]
    fn test_create_order_payload_order_and_fields() {
        let payload = build(OperationKind::CreateOrder, &order_request()).unwrap();

        assert_eq!(payload.primary_type, "VerifyOrder");
        assert_eq!(payload.domain, SigningDomain::trading(1));
        let keys: Vec<&str> = payload.message.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["userAddress", "coin", "nonce", "isBuy", "reduceOnly"]
        );
        assert_eq!(payload.primary_fields().unwrap(), keys);
        assert!(!payload.message.contains_key("size"));
        assert!(!payload.message.contains_key("chainId"));
    }

    #[test]
    fn test_every_kind_matches_registry() {
        for kind in OperationKind::ALL {
            let payload = build(kind, &valid_request(kind)).unwrap();
            let schema = schema_for(kind);
            assert_eq!(payload.primary_type, schema.primary_type);
            let keys: Vec<&str> = payload.message.keys().map(|k| k.as_str()).collect();
            assert_eq!(keys, schema.primary().field_names(), "{}", kind);
        }
    }

    #[test]
    fn test_batch_preserves_order_and_drops_unsigned_fields() {
        let payload = build(OperationKind::CreateOrders, &batch_request()).unwrap();

        assert_eq!(payload.types.names(), vec!["OrderDetails", "VerifyOrders"]);
        assert_eq!(payload.domain.chain_id, 42161);
        let orders = payload.message["orders"].as_array().unwrap();
        let coins: Vec<&str> = orders.iter().map(|o| o["coin"].as_str().unwrap()).collect();
        assert_eq!(coins, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(
            orders[1],
            json!({"coin": "ETH", "isBuy": true, "reduceOnly": false})
        );
    }

    fn required_fields(kind: OperationKind) -> Vec<&'static str> {
        if kind.is_permit() {
            return vec!["nonce", "chainId"];
        }
        let mut fields = schema_for(kind).primary().field_names();
        fields.push("chainId");
        fields
    }

    #[test]
    fn test_missing_fields_are_named() {
        for kind in OperationKind::ALL {
            for field in required_fields(kind) {
                let mut request = valid_request(kind);
                request.as_object_mut().unwrap().remove(field);

                let err = build(kind, &request).unwrap_err();
                assert!(
                    matches!(&err, SdkError::Validation { operation, fields, .. }
                        if operation == kind.as_str() && fields == &vec![field.to_string()]),
                    "{} {}: {:?}",
                    kind,
                    field,
                    err
                );
            }
        }
    }

    #[test]
    fn test_permit_delegate_key_follows_kind() {
        let delegate = "0x00000000000000000000000000000000000000aa";

        let payload = build(
            OperationKind::ApproveAgent,
            &json!({"nonce": 1000, "chainId": 1, "agentAddress": delegate}),
        )
        .unwrap();
        assert_eq!(payload.message["agentAddress"], delegate);

        let payload = build(
            OperationKind::ApproveBuilderFee,
            &json!({"nonce": 1000, "chainId": 1, "builder": delegate}),
        )
        .unwrap();
        assert_eq!(payload.message["builder"], delegate);
    }

    #[test]
    fn test_permit_rejects_other_kinds_delegate_key() {
        let delegate = "0x00000000000000000000000000000000000000aa";

        let err = build(
            OperationKind::ApproveAgent,
            &json!({"nonce": 1000, "chainId": 1, "builder": delegate}),
        )
        .unwrap_err();
        assert_eq!(err.fields(), ["builder".to_string()]);
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = build(
            OperationKind::ApproveBuilderFee,
            &json!({"nonce": 1000, "chainId": 1, "agentAddress": delegate}),
        )
        .unwrap_err();
        assert_eq!(err.fields(), ["agentAddress".to_string()]);
    }

    #[test]
    fn test_malformed_permit_delegate_named_by_its_key() {
        let err = build(
            OperationKind::ApproveBuilderFee,
            &json!({"nonce": 1000, "chainId": 1, "builder": 5}),
        )
        .unwrap_err();
        assert_eq!(err.fields(), ["builder".to_string()]);

        let err = build(
            OperationKind::ApproveAgent,
            &json!({"nonce": 1000, "chainId": 1, "agentAddress": true}),
        )
        .unwrap_err();
        assert_eq!(err.fields(), ["agentAddress".to_string()]);
    }

    #[test]
    fn test_missing_chain_id() {
        let mut request = order_request();
        request.as_object_mut().unwrap().remove("chainId");
        let err = build(OperationKind::CreateOrder, &request).unwrap_err();
        assert_eq!(err.fields(), ["chainId".to_string()]);
    }

    #[test]
    fn test_missing_field_inside_batch_item() {
        let mut request = batch_request();
        request["orders"][1].as_object_mut().unwrap().remove("reduceOnly");
        let err = build(OperationKind::CreateOrders, &request).unwrap_err();
        assert_eq!(err.fields(), ["orders[1].reduceOnly".to_string()]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut request = batch_request();
        request["orders"] = json!([]);
        let err = build(OperationKind::CreateOrders, &request).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let mut request = order_request();
        request["nonce"] = json!("123456");
        let err = build(OperationKind::CreateOrder, &request).unwrap_err();
        assert_eq!(err.fields(), ["nonce".to_string()]);
    }

    #[test]
    fn test_deprecated_names_rejected() {
        let request = json!({
            "userAddress": "0x123", "coin": "BTC", "nonce": 1, "chainId": 1,
            "is_buy": true, "isBuy": true, "reduceOnly": false
        });
        let err = build(OperationKind::CreateOrder, &request).unwrap_err();
        assert!(err.to_string().contains("is_buy (use 'isBuy')"));

        let request = json!({
            "userAddress": "0x123", "coin": "BTC", "nonce": 1, "chainId": 1,
            "leverage": 5, "leverageType": "cross"
        });
        let err = build(OperationKind::UpdateLeverage, &request).unwrap_err();
        let fields = err.fields();
        assert!(fields.contains(&"isCross".to_string()));
        assert!(fields.iter().any(|f| f.starts_with("leverageType")));
    }

    #[test]
    fn test_unknown_kind() {
        let err = build_payload("unknownKind", &order_request()).unwrap_err();
        assert!(matches!(err, SdkError::UnsupportedOperation(ref v) if v == "unknownKind"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build(OperationKind::CreateOrders, &batch_request()).unwrap();
        let b = build(OperationKind::CreateOrders, &batch_request()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_typed_request_matches_json_request() {
        let order = OrderRequest::market(
            "0x1234567890123456789012345678901234567890",
            "BTC",
            true,
            "0.1",
            123456,
            1,
        );
        let typed = order.signing_payload().unwrap();
        let untyped = build(OperationKind::CreateOrder, &order_request()).unwrap();
        assert_eq!(typed, untyped);
    }

    #[test]
    fn test_signature_from_hex() {
        let mut raw = vec![0x11u8; 32];
        raw.extend(vec![0x22u8; 32]);
        raw.push(1);
        let sig = Signature::from_hex(&format!("0x{}", hex::encode(&raw))).unwrap();
        assert_eq!(sig.r, format!("0x{}", "11".repeat(32)));
        assert_eq!(sig.s, format!("0x{}", "22".repeat(32)));
        assert_eq!(sig.v, 28);

        assert!(matches!(
            Signature::from_hex("0x1234"),
            Err(SdkError::Signing(_))
        ));
    }

    #[test]
    fn test_signed_body_flattens_signature() {
        let request = LeverageRequest {
            user_address: "0x123".into(),
            coin: "BTC".into(),
            leverage: 10,
            is_cross: true,
            nonce: 789,
            chain_id: 1,
        };
        let signed = Signed::new(
            request,
            Signature {
                r: "0xabc".into(),
                s: "0xdef".into(),
                v: 27,
            },
        );
        let body = serde_json::to_value(&signed).unwrap();
        assert_eq!(
            body,
            json!({
                "userAddress": "0x123", "coin": "BTC", "leverage": 10, "isCross": true,
                "nonce": 789, "chainId": 1, "r": "0xabc", "s": "0xdef", "v": 27
            })
        );
    }
}
