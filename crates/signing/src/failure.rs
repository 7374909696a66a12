//! Classification of wallet signing failures.
//!
//! Wallets report unsupported methods in wildly different shapes: some set
//! the proper JSON-RPC error code, some only put a recognizable phrase in the
//! message, some do neither. This module condenses those shapes into a small
//! set of tagged kinds so the cascade's transition logic stays independent of
//! the raw error formats.

use crate::wallet::WalletError;
use lazy_static::lazy_static;
use regex::Regex;

/// JSON-RPC error code for a method the node or wallet does not implement.
///
/// https://www.jsonrpc.org/specification#error_object
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

/// JSON-RPC internal error code. A widespread browser extension returns this
/// when typed data signing is attempted with a connected hardware wallet
/// which rejects the request. This is a heuristic, not a protocol rule: other
/// wallets can raise the same code for unrelated reasons.
pub const SIGNATURE_REJECTED_CODE: i64 = -32603;

lazy_static! {
    // Some wallets don't send the proper error code, so the message text is
    // checked as well.
    static ref METHOD_NOT_FOUND: Regex = Regex::new("(?i)method not found").unwrap();
    static ref RPC_REQUEST_FAILED: Regex = Regex::new("(?i)RPC request failed").unwrap();
    static ref CHAIN_ID_MISMATCH: Regex =
        Regex::new("(?i)provided chainid .* must match the active chainid").unwrap();
    static ref V4_UNSUPPORTED: Regex = Regex::new("(?i)eth_signTypedData_v4 does not exist").unwrap();
    static ref V3_UNSUPPORTED: Regex = Regex::new("(?i)eth_signTypedData_v3 does not exist").unwrap();
}

/// What a wallet failure means for the signing cascade.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    /// The wallet does not implement the attempted method.
    MethodNotFound,
    /// Generic RPC failure with no usable detail; treated like an
    /// unimplemented method.
    RpcRequestFailed,
    /// The wallet requires the chain id in the typed data domain to be a
    /// number instead of a string.
    ChainIdMismatch,
    /// The wallet refused to produce the signature, see
    /// [`SIGNATURE_REJECTED_CODE`].
    SignatureRejected,
    /// The wallet names the v4 typed data method as unsupported.
    TypedDataV4Unsupported,
    /// The wallet names the v3 typed data method as unsupported.
    TypedDataV3Unsupported,
    /// Anything else; not recoverable.
    Other,
}

impl FailureKind {
    /// Whether the failure means the attempted method is not available at
    /// all, as opposed to a failure of the request itself.
    pub fn is_method_unsupported(&self) -> bool {
        matches!(
            self,
            Self::MethodNotFound
                | Self::RpcRequestFailed
                | Self::TypedDataV4Unsupported
                | Self::TypedDataV3Unsupported
        )
    }
}

/// Classifies a wallet failure. The numeric code wins over message patterns.
pub fn classify(error: &WalletError) -> FailureKind {
    match error.code {
        Some(METHOD_NOT_FOUND_CODE) => return FailureKind::MethodNotFound,
        Some(SIGNATURE_REJECTED_CODE) => return FailureKind::SignatureRejected,
        _ => (),
    }
    let message = error.message.as_str();
    if METHOD_NOT_FOUND.is_match(message) {
        FailureKind::MethodNotFound
    } else if RPC_REQUEST_FAILED.is_match(message) {
        FailureKind::RpcRequestFailed
    } else if CHAIN_ID_MISMATCH.is_match(message) {
        FailureKind::ChainIdMismatch
    } else if V4_UNSUPPORTED.is_match(message) {
        FailureKind::TypedDataV4Unsupported
    } else if V3_UNSUPPORTED.is_match(message) {
        FailureKind::TypedDataV3Unsupported
    } else {
        FailureKind::Other
    }
}
