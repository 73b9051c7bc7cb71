//! EIP-712 encoding and hashing over registry-defined structs.
//!
//! - Canonical type strings (`encodeType`)
//! - Struct hashing with nested structs and struct arrays
//! - Domain separator and final digest (0x1901 || domainSeparator || structHash)

use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};
use std::collections::BTreeSet;

use crate::error::{Result, SdkError};
use crate::schema::{SemanticType, TypeMap};
use crate::signing::{SigningDomain, SigningPayload};

pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data.as_ref()));
    out
}

fn unknown_struct(name: &str) -> SdkError {
    SdkError::Signing(format!("Struct '{}' is not declared in types", name))
}

/// Canonical type string: primary struct first, then every struct it
/// references (transitively) sorted by name.
pub fn encode_type(primary: &str, types: &TypeMap) -> Result<String> {
    let mut deps = BTreeSet::new();
    collect_deps(primary, types, &mut deps)?;
    deps.remove(primary);

    let mut out = String::new();
    for name in std::iter::once(primary).chain(deps.iter().copied()) {
        let def = types.get(name).ok_or_else(|| unknown_struct(name))?;
        let fields: Vec<String> = def
            .fields
            .iter()
            .map(|f| format!("{} {}", f.ty, f.name))
            .collect();
        out.push_str(&format!("{}({})", def.name, fields.join(",")));
    }
    Ok(out)
}

fn collect_deps<'a>(
    name: &'a str,
    types: &'a TypeMap,
    found: &mut BTreeSet<&'a str>,
) -> Result<()> {
    if !found.insert(name) {
        return Ok(());
    }
    let def = types.get(name).ok_or_else(|| unknown_struct(name))?;
    for field in def.fields {
        if let Some(referenced) = field.ty.struct_ref() {
            collect_deps(referenced, types, found)?;
        }
    }
    Ok(())
}

pub fn type_hash(primary: &str, types: &TypeMap) -> Result<[u8; 32]> {
    Ok(keccak256(encode_type(primary, types)?))
}

/// `keccak256(typeHash || encodeData(message))`
pub fn hash_struct(
    primary: &str,
    types: &TypeMap,
    message: &Map<String, Value>,
) -> Result<[u8; 32]> {
    let def = types.get(primary).ok_or_else(|| unknown_struct(primary))?;

    let mut enc = Vec::with_capacity(32 * (def.fields.len() + 1));
    enc.extend_from_slice(&type_hash(primary, types)?);
    for field in def.fields {
        let value = message.get(field.name).ok_or_else(|| {
            SdkError::Signing(format!("{} is missing field '{}'", primary, field.name))
        })?;
        enc.extend_from_slice(&encode_value(field.ty, value, types)?);
    }
    Ok(keccak256(enc))
}

fn encode_value(ty: SemanticType, value: &Value, types: &TypeMap) -> Result<[u8; 32]> {
    let mismatch = || SdkError::Signing(format!("Value {} does not encode as {}", value, ty));

    match ty {
        SemanticType::String => value.as_str().map(keccak256).ok_or_else(mismatch),
        SemanticType::Bool => {
            let b = value.as_bool().ok_or_else(mismatch)?;
            let mut word = [0u8; 32];
            word[31] = b as u8;
            Ok(word)
        }
        SemanticType::Uint64 => {
            let n = value.as_u64().ok_or_else(mismatch)?;
            let mut word = [0u8; 32];
            word[24..].copy_from_slice(&n.to_be_bytes());
            Ok(word)
        }
        SemanticType::Uint256 => parse_uint256(value),
        SemanticType::Address => {
            let bytes = decode_fixed(value, 20).ok_or_else(mismatch)?;
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(&bytes);
            Ok(word)
        }
        SemanticType::Bytes32 => {
            let bytes = decode_fixed(value, 32).ok_or_else(mismatch)?;
            let mut word = [0u8; 32];
            word.copy_from_slice(&bytes);
            Ok(word)
        }
        SemanticType::Struct(name) => {
            let obj = value.as_object().ok_or_else(mismatch)?;
            hash_struct(name, types, obj)
        }
        SemanticType::StructArray(name) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            let mut concat = Vec::with_capacity(items.len() * 32);
            for item in items {
                let obj = item.as_object().ok_or_else(mismatch)?;
                concat.extend_from_slice(&hash_struct(name, types, obj)?);
            }
            Ok(keccak256(concat))
        }
    }
}

fn decode_fixed(value: &Value, len: usize) -> Option<Vec<u8>> {
    let s = value.as_str()?.strip_prefix("0x")?;
    let bytes = hex::decode(s).ok()?;
    (bytes.len() == len).then_some(bytes)
}

/// Parse a uint256 given as a JSON number, a decimal string, or a 0x hex string.
pub fn parse_uint256(value: &Value) -> Result<[u8; 32]> {
    let invalid = || SdkError::Signing(format!("Value {} is not a uint256", value));
    let mut word = [0u8; 32];

    if let Some(n) = value.as_u64() {
        word[24..].copy_from_slice(&n.to_be_bytes());
        return Ok(word);
    }

    let s = value.as_str().ok_or_else(invalid)?;
    if let Some(hex_digits) = s.strip_prefix("0x") {
        if hex_digits.is_empty() || hex_digits.len() > 64 {
            return Err(invalid());
        }
        let padded = format!("{:0>64}", hex_digits);
        let bytes = hex::decode(padded).map_err(|_| invalid())?;
        word.copy_from_slice(&bytes);
        return Ok(word);
    }

    let n: u128 = s.parse().map_err(|_| invalid())?;
    word[16..].copy_from_slice(&n.to_be_bytes());
    Ok(word)
}

pub fn domain_separator(domain: &SigningDomain) -> Result<[u8; 32]> {
    let def = domain.struct_def();
    let types = TypeMap::new(&[def]);
    hash_struct(def.name, &types, &domain.to_message())
}

/// Final digest an EIP-712 signer produces a signature over.
pub fn signing_hash(payload: &SigningPayload) -> Result<[u8; 32]> {
    let mut out = Vec::with_capacity(2 + 32 + 32);
    out.push(0x19);
    out.push(0x01);
    out.extend_from_slice(&domain_separator(&payload.domain)?);
    out.extend_from_slice(&hash_struct(
        &payload.primary_type,
        &payload.types,
        &payload.message,
    )?);
    Ok(keccak256(out))
}
