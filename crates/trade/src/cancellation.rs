//! The order cancellation pipeline: sign the cancellation payload, post it,
//! then let the caller mark the local order as cancelled.

use crate::TradeError;
use model::order::{OrderCancellation, OrderUid};
use orderbook_api::OrderbookApi;
use primitive_types::H160;
use signing::WalletSigner;

/// Everything needed to cancel a previously placed order.
#[derive(Clone, Debug)]
pub struct CancelOrderParams {
    pub order_uid: OrderUid,
    pub account: H160,
    pub chain_id: u64,
    pub smart_contract_wallet: bool,
}

/// Signs and submits a cancellation for the given order.
///
/// `on_cancelled` is invoked with the order uid strictly after the API has
/// accepted the cancellation; there is no optimistic local update.
pub async fn cancel_order(
    params: &CancelOrderParams,
    wallet: &dyn WalletSigner,
    api: &dyn OrderbookApi,
    on_cancelled: impl FnOnce(&OrderUid),
) -> Result<(), TradeError> {
    let signature = signing::sign_order_cancellation(
        wallet,
        params.chain_id,
        &params.order_uid,
        params.account,
        params.smart_contract_wallet,
    )
    .await?;
    let cancellation = OrderCancellation {
        order_uid: params.order_uid,
        signature,
    };
    api.cancel_order(&cancellation).await?;
    tracing::info!(uid = %params.order_uid, "order cancellation accepted");
    on_cancelled(&params.order_uid);
    Ok(())
}
