//! The order submission pipeline: build the unsigned order, obtain a
//! signature, post the order and assemble the local entity.

use crate::{
    format::{format_amount, shorten_address},
    TradeError,
};
use chrono::Utc;
use model::order::{
    BuyTokenDestination, Order, OrderData, OrderKind, OrderMetadata, OrderStatus, SellTokenSource,
    TokenInfo,
};
use model::{app_id::AppId, signature::SigningScheme};
use orderbook_api::OrderbookApi;
use primitive_types::{H160, U256};
use signing::WalletSigner;

/// Everything needed to place an order.
#[derive(Clone, Debug)]
pub struct PostOrderParams {
    pub account: H160,
    pub chain_id: u64,
    pub kind: OrderKind,
    pub sell_token: TokenInfo,
    pub buy_token: TokenInfo,
    /// Fee adjusted sell amount in base units.
    pub sell_amount: U256,
    /// Slippage adjusted buy amount in base units.
    pub buy_amount: U256,
    pub sell_amount_before_fee: U256,
    pub fee_amount: U256,
    pub valid_to: u32,
    pub receiver: H160,
    pub app_data: AppId,
    pub smart_contract_wallet: bool,
}

/// Builds the human readable description of the trade, e.g.
/// "Swap 5 WETH for at least 6000 DAI to 0x1234...abcd".
fn order_summary(params: &PostOrderParams) -> String {
    let input_quantifier = match params.kind {
        OrderKind::Buy => "at most ",
        OrderKind::Sell => "",
    };
    let output_quantifier = match params.kind {
        OrderKind::Sell => "at least ",
        OrderKind::Buy => "",
    };
    // The displayed input amount includes the fee.
    let input_amount = format_amount(
        params.sell_amount.saturating_add(params.fee_amount),
        params.sell_token.decimals,
    );
    let output_amount = format_amount(params.buy_amount, params.buy_token.decimals);

    let base = format!(
        "Swap {input_quantifier}{input_amount} {} for {output_quantifier}{output_amount} {}",
        params.sell_token.symbol, params.buy_token.symbol,
    );
    if params.receiver == params.account {
        base
    } else {
        format!("{base} to {}", shorten_address(params.receiver))
    }
}

/// Signs an order and submits it to the order API.
///
/// All or nothing: a signing failure means nothing is submitted, an API
/// rejection means no local entity is created. On success the returned order
/// has status [`OrderStatus::Pending`], or
/// [`OrderStatus::PresignaturePending`] when the wallet could only be served
/// with the presignature fallback.
pub async fn sign_and_submit_order(
    params: &PostOrderParams,
    wallet: &dyn WalletSigner,
    api: &dyn OrderbookApi,
) -> Result<Order, TradeError> {
    let data = OrderData {
        sell_token: params.sell_token.address,
        buy_token: params.buy_token.address,
        receiver: Some(params.receiver),
        sell_amount: params.sell_amount,
        buy_amount: params.buy_amount,
        valid_to: params.valid_to,
        app_data: params.app_data,
        fee_amount: params.fee_amount,
        kind: params.kind,
        // Orders are always fill or kill.
        partially_fillable: false,
        sell_token_balance: SellTokenSource::Erc20,
        buy_token_balance: BuyTokenDestination::Erc20,
    };

    let signature = signing::sign_order(
        wallet,
        params.chain_id,
        &data,
        params.account,
        params.smart_contract_wallet,
    )
    .await?;
    let status = match signature.scheme() {
        SigningScheme::PreSign => OrderStatus::PresignaturePending,
        _ => OrderStatus::Pending,
    };

    let creation = model::order::OrderCreation {
        data,
        from: Some(params.account),
        signature: signature.clone(),
    };
    let uid = api.create_order(&creation).await?;
    tracing::info!(%uid, kind = params.kind.label(), "order created");

    Ok(Order {
        metadata: OrderMetadata {
            uid,
            owner: params.account,
            summary: order_summary(params),
            input_token: params.sell_token.clone(),
            output_token: params.buy_token.clone(),
            status,
            creation_date: Utc::now(),
            sell_amount_before_fee: params.sell_amount_before_fee,
        },
        data,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::order::OrderUid;
    use model::signature::Signature;
    use orderbook_api::{MockOrderbookApi, OrderApiError};
    use signing::{MockWalletSigner, SigningError, WalletError};

    fn params() -> PostOrderParams {
        PostOrderParams {
            account: H160([0xaa; 20]),
            chain_id: 1,
            kind: OrderKind::Sell,
            sell_token: TokenInfo {
                address: H160([0x11; 20]),
                decimals: 18,
                symbol: "TokenA".to_string(),
            },
            buy_token: TokenInfo {
                address: H160([0x22; 20]),
                decimals: 18,
                symbol: "TokenB".to_string(),
            },
            sell_amount: U256::from(5u64) * U256::exp10(18),
            buy_amount: U256::from(10u64) * U256::exp10(18),
            sell_amount_before_fee: U256::from(5u64) * U256::exp10(18),
            fee_amount: U256::zero(),
            valid_to: 1_700_000_000,
            receiver: H160([0xaa; 20]),
            app_data: AppId([0x44; 32]),
            smart_contract_wallet: false,
        }
    }

    #[test]
    fn summary_for_sell_order() {
        assert_eq!(
            order_summary(&params()),
            "Swap 5 TokenA for at least 10 TokenB"
        );
    }

    #[test]
    fn summary_for_buy_order() {
        let params = PostOrderParams {
            kind: OrderKind::Buy,
            ..params()
        };
        assert_eq!(
            order_summary(&params),
            "Swap at most 5 TokenA for 10 TokenB"
        );
    }

    #[test]
    fn summary_includes_fee_in_input_amount() {
        let params = PostOrderParams {
            fee_amount: U256::exp10(18),
            ..params()
        };
        assert_eq!(
            order_summary(&params),
            "Swap 6 TokenA for at least 10 TokenB"
        );
    }

    #[test]
    fn summary_names_distinct_recipients() {
        let params = PostOrderParams {
            receiver: H160([0xbb; 20]),
            ..params()
        };
        assert_eq!(
            order_summary(&params),
            "Swap 5 TokenA for at least 10 TokenB to 0xbbbb...bbbb"
        );
    }

    #[tokio::test]
    async fn submits_signed_order_and_assembles_entity() {
        let mut wallet = MockWalletSigner::new();
        wallet
            .expect_sign_typed_data()
            .times(1)
            .returning(|_, _| Ok(vec![1; 65]));

        let uid = OrderUid::from_integer(7);
        let mut api = MockOrderbookApi::new();
        api.expect_create_order()
            .times(1)
            .withf(|creation| {
                creation.signature.scheme() == SigningScheme::Eip712
                    && !creation.data.partially_fillable
                    && creation.from == Some(H160([0xaa; 20]))
            })
            .returning(move |_| Ok(uid));

        let order = sign_and_submit_order(&params(), &wallet, &api)
            .await
            .unwrap();
        assert_eq!(order.metadata.uid, uid);
        assert_eq!(order.metadata.status, OrderStatus::Pending);
        assert_eq!(order.signature.scheme(), SigningScheme::Eip712);
        assert_eq!(order.metadata.summary, "Swap 5 TokenA for at least 10 TokenB");
        assert!(!order.data.partially_fillable);
    }

    #[tokio::test]
    async fn orders_are_always_fill_or_kill() {
        for kind in [OrderKind::Sell, OrderKind::Buy] {
            for smart_contract_wallet in [false, true] {
                let mut wallet = MockWalletSigner::new();
                wallet
                    .expect_sign_typed_data()
                    .returning(|_, _| Ok(vec![1; 65]));

                let mut api = MockOrderbookApi::new();
                api.expect_create_order()
                    .withf(|creation| !creation.data.partially_fillable)
                    .returning(|_| Ok(OrderUid::default()));

                let params = PostOrderParams {
                    kind,
                    smart_contract_wallet,
                    ..params()
                };
                let order = sign_and_submit_order(&params, &wallet, &api).await.unwrap();
                assert!(!order.data.partially_fillable);
            }
        }
    }

    #[tokio::test]
    async fn smart_contract_fallback_produces_presignature_pending_order() {
        let mut wallet = MockWalletSigner::new();
        wallet
            .expect_sign_typed_data()
            .times(1)
            .returning(|_, _| Err(WalletError::new(-32601, "Method not found")));

        let mut api = MockOrderbookApi::new();
        api.expect_create_order()
            .times(1)
            .withf(|creation| {
                creation.signature == Signature::PreSign(H160([0xaa; 20]))
                    && creation.signature.to_bytes() == [0xaa; 20].to_vec()
            })
            .returning(|_| Ok(OrderUid::from_integer(1)));

        let params = PostOrderParams {
            smart_contract_wallet: true,
            ..params()
        };
        let order = sign_and_submit_order(&params, &wallet, &api).await.unwrap();
        assert_eq!(order.metadata.status, OrderStatus::PresignaturePending);
        assert_eq!(order.signature, Signature::PreSign(H160([0xaa; 20])));
    }

    #[tokio::test]
    async fn unsupported_chain_fails_before_signing_and_submission() {
        // Neither mock has expectations; any call would panic.
        let wallet = MockWalletSigner::new();
        let api = MockOrderbookApi::new();
        let params = PostOrderParams {
            chain_id: 1337,
            ..params()
        };
        let err = sign_and_submit_order(&params, &wallet, &api)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TradeError::Signing(SigningError::UnsupportedNetwork(_))
        ));
    }

    #[tokio::test]
    async fn signing_failure_submits_nothing() {
        let mut wallet = MockWalletSigner::new();
        wallet
            .expect_sign_typed_data()
            .times(1)
            .returning(|_, _| Err(WalletError::new(4001, "User rejected the request")));

        // No create_order expectation: submission would panic.
        let api = MockOrderbookApi::new();
        let err = sign_and_submit_order(&params(), &wallet, &api)
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Signing(_)));
    }

    #[tokio::test]
    async fn api_rejection_creates_no_entity() {
        let mut wallet = MockWalletSigner::new();
        wallet
            .expect_sign_typed_data()
            .times(1)
            .returning(|_, _| Ok(vec![1; 65]));

        let mut api = MockOrderbookApi::new();
        api.expect_create_order().times(1).returning(|_| {
            Err(OrderApiError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: "DuplicateOrder: order already exists".to_string(),
            })
        });

        let err = sign_and_submit_order(&params(), &wallet, &api)
            .await
            .unwrap_err();
        assert!(matches!(err, TradeError::Api(_)));
    }
}
