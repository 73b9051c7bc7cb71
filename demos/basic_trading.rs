//! Basic trading example demonstrating the Limits SDK.
//!
//! This example shows how to:
//! 1. Inspect the typed-data payload and digest for an order
//! 2. Place a single order through an external signer
//! 3. Place a batch and read the per-order outcome
//! 4. Approve an agent permit
//!
//! The signer here prints each payload and returns the signature found in
//! LIMITS_SIGNATURE, standing in for a wallet.

use async_trait::async_trait;
use limits_sdk::{
    BatchItem, BatchOrderRequest, ClientConfig, LimitsClient, OrderRequest, SdkError,
    SignableRequest, SigningPayload, TypedDataSigner,
};
use std::time::{SystemTime, UNIX_EPOCH};

struct ConsoleSigner {
    signature: Option<String>,
}

#[async_trait]
impl TypedDataSigner for ConsoleSigner {
    async fn sign_typed_data(&self, payload: &SigningPayload) -> limits_sdk::Result<String> {
        println!("   Payload to sign: {}", payload.to_json()?);
        println!("   Digest: 0x{}", hex::encode(payload.signing_hash()?));
        self.signature
            .clone()
            .ok_or_else(|| SdkError::Signing("LIMITS_SIGNATURE is not set".to_string()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("=== Limits SDK Example ===\n");

    let user = "0x1234567890123456789012345678901234567890";
    let chain_id = 42161;
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;

    // Uses LIMITS_BASE_URL env var or defaults to localhost
    let client = LimitsClient::new(ClientConfig::default())?;
    let signer = ConsoleSigner {
        signature: std::env::var("LIMITS_SIGNATURE").ok(),
    };

    // === Step 1: Inspect the payload ===
    println!("1. Building order payload...");
    let order = OrderRequest::market(user, "BTC", true, "0.1", nonce, chain_id);
    let payload = order.signing_payload()?;
    println!("   Primary type: {}", payload.primary_type);
    println!("   Fields: {:?}\n", payload.primary_fields().unwrap_or_default());

    // === Step 2: Place a single order ===
    println!("2. Placing market buy for 0.1 BTC...");
    match client.place_order(order, &signer).await {
        Ok(resp) => println!("   {} (success={})\n", resp.message, resp.success),
        Err(e) => println!("   Order failed [{}]: {}\n", e.code(), e),
    }

    // === Step 3: Place a batch ===
    println!("3. Placing batch of 3 orders...");
    let item = |coin: &str, is_buy: bool, size: &str, reduce_only: bool| BatchItem {
        coin: coin.to_string(),
        is_buy,
        size: size.to_string(),
        reduce_only,
        client_order_id: None,
        limit_price: None,
        order_type: None,
    };
    let batch = BatchOrderRequest {
        user_address: user.to_string(),
        nonce: nonce + 1,
        chain_id,
        orders: vec![
            item("BTC", true, "0.1", false),
            item("ETH", true, "2.0", false),
            item("SOL", false, "10", true),
        ],
    };
    match client.place_batch_orders(batch, &signer).await {
        Ok(result) => {
            println!("   {}/{} orders successful", result.successful, result.total);
            for failure in &result.errors {
                println!("   Order {} ({}): {}", failure.index, failure.order.coin, failure.error);
            }
            println!();
        }
        Err(e) => println!("   Batch failed [{}]: {}\n", e.code(), e),
    }

    // === Step 4: Approve an agent ===
    println!("4. Approving agent...");
    let outcome = client.approve_agent(nonce + 2, chain_id, &signer).await;
    println!("   {}", serde_json::to_string(&outcome)?);

    println!("\n=== Example Complete ===");
    Ok(())
}
