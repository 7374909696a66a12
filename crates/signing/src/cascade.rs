//! The signing method cascade.
//!
//! Which signing method a connected wallet supports cannot be queried up
//! front, so a signature is obtained by trying candidate methods in a fixed
//! order and reclassifying each failure to pick the next one. The walk is
//! strictly sequential (wallets do not handle concurrent signing requests
//! reliably, and every transition depends on the failure just observed) and
//! strictly bounded: no method is ever attempted twice, so a run makes at
//! most five wallet round trips.

use crate::{
    failure::{classify, FailureKind},
    payload::Payload,
    wallet::{TypedDataMethod, WalletError, WalletSigner},
};
use model::{
    domain::{TypedDataDomain, UnsupportedNetworkError},
    signature::{hashed_eip712_message, Signature, SigningScheme},
};
use std::collections::HashSet;
use thiserror::Error;

/// One candidate way of obtaining a signature from a wallet.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SigningMethod {
    /// `eth_signTypedData_v4` with the chain id as a decimal string.
    TypedDataV4,
    /// `eth_signTypedData_v4` with the chain id coerced to an integer, for
    /// wallets that reject the string form.
    TypedDataV4IntChainId,
    /// Version-wrapped `eth_signTypedData`.
    TypedData,
    /// `eth_signTypedData_v3`.
    TypedDataV3,
    /// Legacy personal message signing over the EIP-712 digest. Semantically
    /// weaker and unavailable to smart contract wallets.
    EthSign,
}

impl SigningMethod {
    /// The next method to try when the wallet turns out not to implement
    /// this one.
    fn next_on_unsupported(self) -> Option<Self> {
        match self {
            Self::TypedDataV4 | Self::TypedDataV4IntChainId => Some(Self::TypedData),
            Self::TypedData => Some(Self::TypedDataV3),
            Self::TypedDataV3 => Some(Self::EthSign),
            Self::EthSign => None,
        }
    }

    fn typed_data_method(self) -> Option<TypedDataMethod> {
        match self {
            Self::TypedDataV4 | Self::TypedDataV4IntChainId => {
                Some(TypedDataMethod::EthSignTypedDataV4)
            }
            Self::TypedData => Some(TypedDataMethod::EthSignTypedData),
            Self::TypedDataV3 => Some(TypedDataMethod::EthSignTypedDataV3),
            Self::EthSign => None,
        }
    }

    fn int_chain_id(self) -> bool {
        matches!(self, Self::TypedDataV4IntChainId)
    }

    /// The scheme a signature produced by this method is submitted under.
    fn scheme(self, smart_contract_wallet: bool) -> SigningScheme {
        match (self, smart_contract_wallet) {
            (Self::EthSign, _) => SigningScheme::EthSign,
            (_, true) => SigningScheme::Eip1271,
            (_, false) => SigningScheme::Eip712,
        }
    }
}

/// Fatal outcome of a signing run. The recoverable failure kinds never show
/// up here; they are consumed by the cascade itself.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error(transparent)]
    UnsupportedNetwork(#[from] UnsupportedNetworkError),
    /// Every candidate method failed with a recoverable error. Carries the
    /// last wallet failure.
    #[error("all signing methods exhausted: {0}")]
    Exhausted(WalletError),
    /// A smart contract wallet does not expose any typed data signing
    /// method. The caller may fall back to a presignature.
    #[error("smart contract wallet does not support off-chain signing: {0}")]
    SmartContractSigningUnsupported(WalletError),
    /// Smart contract wallets cannot produce EIP-191 personal signatures.
    #[error("smart contract wallets cannot sign with eth_sign")]
    EthSignUnsupported,
    /// The wallet reported success but returned bytes that do not form a
    /// valid signature for the scheme.
    #[error("wallet returned a malformed signature: {0}")]
    MalformedSignature(anyhow::Error),
    /// The wallet failed with an error outside the recoverable set; it is
    /// surfaced unchanged.
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Drives a single payload through the signing method cascade, starting at
/// `start`, until one method produces a signature or the run turns fatal.
pub async fn sign_payload(
    wallet: &dyn WalletSigner,
    payload: &Payload<'_>,
    domain: &TypedDataDomain,
    start: SigningMethod,
    smart_contract_wallet: bool,
) -> Result<Signature, SigningError> {
    let mut visited = HashSet::new();
    let mut method = start;
    loop {
        visited.insert(method);
        if smart_contract_wallet && method == SigningMethod::EthSign {
            return Err(SigningError::EthSignUnsupported);
        }
        let scheme = method.scheme(smart_contract_wallet);
        tracing::debug!(?method, ?scheme, "requesting wallet signature");

        let result = match method.typed_data_method() {
            Some(typed_data_method) => {
                let data = payload.typed_data(domain, method.int_chain_id());
                wallet.sign_typed_data(typed_data_method, &data).await
            }
            None => {
                let message = hashed_eip712_message(&domain.separator(), &payload.hash_struct());
                wallet.sign_message(message).await
            }
        };
        let err = match result {
            Ok(bytes) => {
                return Signature::from_bytes(scheme, &bytes)
                    .map_err(SigningError::MalformedSignature)
            }
            Err(err) => err,
        };

        let kind = classify(&err);
        tracing::debug!(?method, ?kind, %err, "wallet signing attempt failed");
        if smart_contract_wallet && kind.is_method_unsupported() {
            // No further methods are tried: every unsupported-method walk for
            // a contract wallet can only dead end in eth_sign, which it is
            // not allowed to use. The presignature fallback takes over.
            return Err(SigningError::SmartContractSigningUnsupported(err));
        }
        let next = match kind {
            FailureKind::MethodNotFound | FailureKind::RpcRequestFailed => {
                method.next_on_unsupported()
            }
            FailureKind::ChainIdMismatch if method == SigningMethod::TypedDataV4 => {
                Some(SigningMethod::TypedDataV4IntChainId)
            }
            FailureKind::SignatureRejected if smart_contract_wallet => {
                // The rejection fallback targets eth_sign, which contract
                // wallets cannot use.
                return Err(SigningError::Wallet(err));
            }
            FailureKind::SignatureRejected if method != SigningMethod::EthSign => {
                Some(SigningMethod::EthSign)
            }
            FailureKind::TypedDataV4Unsupported => Some(SigningMethod::TypedDataV3),
            FailureKind::TypedDataV3Unsupported => Some(SigningMethod::EthSign),
            _ => return Err(SigningError::Wallet(err)),
        };
        method = match next {
            Some(next) if !visited.contains(&next) => next,
            _ => return Err(SigningError::Exhausted(err)),
        };
    }
}
