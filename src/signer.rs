use async_trait::async_trait;

use crate::error::Result;
use crate::signing::SigningPayload;

/// An external typed-data signer (wallet, HSM, remote signing service).
///
/// Implementations receive the exact `{domain, types, primaryType, message}`
/// payload and return a 65-byte `r || s || v` signature as hex. The SDK never
/// holds keys itself.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn sign_typed_data(&self, payload: &SigningPayload) -> Result<String>;
}

#[async_trait]
impl<T: TypedDataSigner + ?Sized> TypedDataSigner for std::sync::Arc<T> {
    async fn sign_typed_data(&self, payload: &SigningPayload) -> Result<String> {
        (**self).sign_typed_data(payload).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed signature and remembers every payload it was asked to sign.
    pub struct RecordingSigner {
        pub signature: String,
        pub seen: Mutex<Vec<SigningPayload>>,
    }

    impl RecordingSigner {
        pub fn new() -> Self {
            let mut raw = vec![0x11u8; 32];
            raw.extend(vec![0x22u8; 32]);
            raw.push(0);
            Self {
                signature: format!("0x{}", hex::encode(raw)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TypedDataSigner for RecordingSigner {
        async fn sign_typed_data(&self, payload: &SigningPayload) -> Result<String> {
            self.seen.lock().unwrap().push(payload.clone());
            Ok(self.signature.clone())
        }
    }
}
