//! The two payload shapes that get signed under the settlement domain, and
//! their presentation as EIP-712 typed data requests.

use crate::wallet::TypedData;
use model::{
    domain::TypedDataDomain,
    order::{OrderCancellation, OrderData, OrderUid},
};
use primitive_types::H160;
use serde_json::{json, Map, Value};

/// Content of a single signing attempt: either a full order or the
/// cancellation of a previously placed one.
#[derive(Clone, Copy, Debug)]
pub enum Payload<'a> {
    Order(&'a OrderData),
    Cancellation(&'a OrderUid),
}

impl Payload<'_> {
    /// EIP-712 hashStruct of the payload. This is what ECDSA signatures are
    /// recovered against and what contract wallets verify on chain.
    pub fn hash_struct(&self) -> [u8; 32] {
        match self {
            Self::Order(order) => order.hash_struct(),
            Self::Cancellation(order_uid) => OrderCancellation::hash_struct(order_uid),
        }
    }

    fn primary_type(&self) -> &'static str {
        match self {
            Self::Order(_) => "Order",
            Self::Cancellation(_) => "OrderCancellation",
        }
    }

    fn type_definitions(&self) -> Value {
        match self {
            Self::Order(_) => json!([
                { "name": "sellToken", "type": "address" },
                { "name": "buyToken", "type": "address" },
                { "name": "receiver", "type": "address" },
                { "name": "sellAmount", "type": "uint256" },
                { "name": "buyAmount", "type": "uint256" },
                { "name": "validTo", "type": "uint32" },
                { "name": "appData", "type": "bytes32" },
                { "name": "feeAmount", "type": "uint256" },
                { "name": "kind", "type": "string" },
                { "name": "partiallyFillable", "type": "bool" },
                { "name": "sellTokenBalance", "type": "string" },
                { "name": "buyTokenBalance", "type": "string" },
            ]),
            Self::Cancellation(_) => json!([
                { "name": "orderUid", "type": "bytes" },
            ]),
        }
    }

    fn message(&self) -> Value {
        match self {
            Self::Order(order) => {
                // Unwrap because serializing an order to a JSON value cannot
                // fail.
                let mut message = serde_json::to_value(order).unwrap();
                if message["receiver"].is_null() {
                    // The struct hash extends a missing receiver to the zero
                    // address; the typed data message has to show the same
                    // value.
                    message["receiver"] = json!(H160::zero());
                }
                message
            }
            Self::Cancellation(order_uid) => json!({ "orderUid": order_uid.to_string() }),
        }
    }

    /// Builds the complete typed data request for this payload. The domain's
    /// chain id is rendered as a decimal string unless the wallet demands the
    /// integer form.
    pub fn typed_data(&self, domain: &TypedDataDomain, int_chain_id: bool) -> TypedData {
        let mut types = Map::new();
        types.insert(
            "EIP712Domain".to_string(),
            json!([
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" },
            ]),
        );
        types.insert(self.primary_type().to_string(), self.type_definitions());

        TypedData {
            types: Value::Object(types),
            domain: json!({
                "name": domain.name,
                "version": domain.version,
                "chainId": if int_chain_id {
                    json!(domain.chain_id)
                } else {
                    json!(domain.chain_id.to_string())
                },
                "verifyingContract": domain.verifying_contract,
            }),
            primary_type: self.primary_type().to_string(),
            message: self.message(),
        }
    }
}
