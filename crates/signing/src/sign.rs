//! Public signing operations: one for orders, one for cancellations. Both
//! resolve the chain's typed data domain, run the signing method cascade and,
//! for smart contract wallets without any off-chain signing support, fall
//! back to a presignature.

use crate::{
    cascade::{sign_payload, SigningError, SigningMethod},
    payload::Payload,
    wallet::WalletSigner,
};
use model::{
    domain,
    order::{OrderData, OrderUid},
    signature::Signature,
};
use primitive_types::H160;

/// Signs an order for submission.
///
/// Returns the signature paired with the scheme it was produced under; for
/// the presignature fallback this is [`Signature::PreSign`] carrying the
/// owner address, and the resulting order only becomes valid once a separate
/// on-chain transaction confirms it.
pub async fn sign_order(
    wallet: &dyn WalletSigner,
    chain_id: u64,
    order: &OrderData,
    owner: H160,
    smart_contract_wallet: bool,
) -> Result<Signature, SigningError> {
    sign(
        wallet,
        chain_id,
        Payload::Order(order),
        owner,
        smart_contract_wallet,
    )
    .await
}

/// Signs the cancellation of a previously placed order.
pub async fn sign_order_cancellation(
    wallet: &dyn WalletSigner,
    chain_id: u64,
    order_uid: &OrderUid,
    owner: H160,
    smart_contract_wallet: bool,
) -> Result<Signature, SigningError> {
    sign(
        wallet,
        chain_id,
        Payload::Cancellation(order_uid),
        owner,
        smart_contract_wallet,
    )
    .await
}

async fn sign(
    wallet: &dyn WalletSigner,
    chain_id: u64,
    payload: Payload<'_>,
    owner: H160,
    smart_contract_wallet: bool,
) -> Result<Signature, SigningError> {
    let domain = domain::domain(chain_id)?;
    let result = sign_payload(
        wallet,
        &payload,
        &domain,
        SigningMethod::TypedDataV4,
        smart_contract_wallet,
    )
    .await;
    match result {
        Err(SigningError::SmartContractSigningUnsupported(err)) => {
            tracing::warn!(
                %owner,
                %err,
                "wallet does not support off-chain signing, falling back to presignature"
            );
            Ok(Signature::PreSign(owner))
        }
        other => other,
    }
}
