//! Abstraction over the connected wallet. Wallets are opaque and
//! heterogeneous: which signing methods they support is only discovered by
//! trying them, and failures surface as JSON-RPC style errors with a numeric
//! code, a free-text message, or both.

use serde::Serialize;
use thiserror::Error;

/// Failure returned by a wallet for a single signing request.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("wallet error{}: {message}", .code.map(|code| format!(" (code {code})")).unwrap_or_default())]
pub struct WalletError {
    pub code: Option<i64>,
    pub message: String,
}

impl WalletError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }
}

/// The RPC flavor used for a typed data signing request. Which of these a
/// wallet implements varies by vendor and version.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypedDataMethod {
    /// `eth_signTypedData`, the version-wrapped form for wallets that need an
    /// explicit typed data version.
    EthSignTypedData,
    /// `eth_signTypedData_v3`
    EthSignTypedDataV3,
    /// `eth_signTypedData_v4`
    EthSignTypedDataV4,
}

/// A complete typed data signing request as presented to the wallet.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: serde_json::Value,
    pub domain: serde_json::Value,
    pub primary_type: String,
    pub message: serde_json::Value,
}

/// The signing capabilities a wallet exposes. Implementations forward to the
/// wallet's RPC interface; tests script failures per method.
#[mockall::automock]
#[async_trait::async_trait]
pub trait WalletSigner: Send + Sync {
    /// Signs typed data with the requested method flavor. Returns the raw
    /// signature bytes: 65 bytes (r + s + v) for key-based wallets, an
    /// arbitrary byte string for contract wallets.
    async fn sign_typed_data(
        &self,
        method: TypedDataMethod,
        data: &TypedData,
    ) -> Result<Vec<u8>, WalletError>;

    /// Signs a personal message (EIP-191) over the given 32 byte digest. The
    /// wallet applies the `\x19Ethereum Signed Message` prefix itself.
    async fn sign_message(&self, message: [u8; 32]) -> Result<Vec<u8>, WalletError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_error_display() {
        assert_eq!(
            WalletError::new(-32601, "Method not found").to_string(),
            "wallet error (code -32601): Method not found"
        );
        assert_eq!(
            WalletError::from_message("RPC request failed").to_string(),
            "wallet error: RPC request failed"
        );
    }
}
