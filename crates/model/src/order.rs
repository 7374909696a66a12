//! Order types as they travel to the order API, plus the locally tracked
//! order entity that is assembled once the API has accepted a submission.

use crate::{
    app_id::AppId,
    domain::DomainSeparator,
    signature::{self, Signature},
    u256_decimal,
};
use chrono::{DateTime, Utc};
use hex_literal::hex;
use primitive_types::{H160, H256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};
use strum::EnumString;
use web3::signing;

/// The exact fields that get signed and verified by the settlement contract.
///
/// Orders are immutable once built.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub sell_token: H160,
    pub buy_token: H160,
    #[serde(default)]
    pub receiver: Option<H160>,
    #[serde(with = "u256_decimal")]
    pub sell_amount: U256,
    #[serde(with = "u256_decimal")]
    pub buy_amount: U256,
    pub valid_to: u32,
    pub app_data: AppId,
    #[serde(with = "u256_decimal")]
    pub fee_amount: U256,
    pub kind: OrderKind,
    pub partially_fillable: bool,
    #[serde(default)]
    pub sell_token_balance: SellTokenSource,
    #[serde(default)]
    pub buy_token_balance: BuyTokenDestination,
}

impl OrderData {
    // keccak256 of the order struct type string used by the settlement
    // contract.
    pub const TYPE_HASH: [u8; 32] =
        hex!("d5a25ba2e97094ad7d83dc28a6572da797d6b3e7fc6663bd93efb789fc17e489");

    // keccak256("erc20")
    pub const BALANCE_ERC20: [u8; 32] =
        hex!("5a28e9363bb942b639270062aa6bb295f434bcdfc42c97267bf003f272060dc9");
    // keccak256("external")
    pub const BALANCE_EXTERNAL: [u8; 32] =
        hex!("abee3b73373acd583a130924aad6dc38cfdc44ba0555ba94ce2ff63980ea0632");
    // keccak256("internal")
    pub const BALANCE_INTERNAL: [u8; 32] =
        hex!("4ac99ace14ee0a5ef932dc609df0943ab7ac16b7583634612f8dc35a4289a6ce");

    /// Returns the value of hashStruct() over the order data as defined by
    /// EIP-712.
    ///
    /// https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
    pub fn hash_struct(&self) -> [u8; 32] {
        let mut hash_data = [0u8; 416];
        hash_data[0..32].copy_from_slice(&Self::TYPE_HASH);
        // Some slots are not assigned (stay 0) because all values are extended
        // to 256 bits.
        hash_data[44..64].copy_from_slice(self.sell_token.as_fixed_bytes());
        hash_data[76..96].copy_from_slice(self.buy_token.as_fixed_bytes());
        hash_data[108..128]
            .copy_from_slice(self.receiver.unwrap_or_else(H160::zero).as_fixed_bytes());
        self.sell_amount.to_big_endian(&mut hash_data[128..160]);
        self.buy_amount.to_big_endian(&mut hash_data[160..192]);
        hash_data[220..224].copy_from_slice(&self.valid_to.to_be_bytes());
        hash_data[224..256].copy_from_slice(&self.app_data.0);
        self.fee_amount.to_big_endian(&mut hash_data[256..288]);
        hash_data[288..320].copy_from_slice(match self.kind {
            OrderKind::Sell => &OrderKind::SELL,
            OrderKind::Buy => &OrderKind::BUY,
        });
        hash_data[351] = self.partially_fillable as u8;
        hash_data[352..384].copy_from_slice(match self.sell_token_balance {
            SellTokenSource::Erc20 => &Self::BALANCE_ERC20,
            SellTokenSource::External => &Self::BALANCE_EXTERNAL,
            SellTokenSource::Internal => &Self::BALANCE_INTERNAL,
        });
        hash_data[384..416].copy_from_slice(match self.buy_token_balance {
            BuyTokenDestination::Erc20 => &Self::BALANCE_ERC20,
            BuyTokenDestination::Internal => &Self::BALANCE_INTERNAL,
        });
        signing::keccak256(&hash_data)
    }

    /// The unique identifier the order will be known under once accepted.
    pub fn uid(&self, domain: &DomainSeparator, owner: &H160) -> OrderUid {
        OrderUid::from_parts(
            H256(signature::hashed_eip712_message(
                domain,
                &self.hash_struct(),
            )),
            *owner,
            self.valid_to,
        )
    }
}

/// An order as posted to the order API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreation {
    #[serde(flatten)]
    pub data: OrderData,
    pub from: Option<H160>,
    #[serde(flatten)]
    pub signature: Signature,
}

/// An order cancellation as posted to the order API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancellation {
    pub order_uid: OrderUid,
    #[serde(flatten)]
    pub signature: Signature,
}

// EIP-712
impl OrderCancellation {
    // keccak256("OrderCancellation(bytes orderUid)")
    pub const TYPE_HASH: [u8; 32] =
        hex!("7b41b3a6e2b3cae020a3b2f9cdc997e0d420643957e7fea81747e984e47c88ec");

    /// Returns the value of hashStruct() over a cancellation of the given
    /// order.
    pub fn hash_struct(order_uid: &OrderUid) -> [u8; 32] {
        let mut hash_data = [0u8; 64];
        hash_data[0..32].copy_from_slice(&Self::TYPE_HASH);
        hash_data[32..64].copy_from_slice(&signing::keccak256(&order_uid.0));
        signing::keccak256(&hash_data)
    }
}

/// Address and display metadata of a traded token.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: H160,
    pub decimals: u8,
    pub symbol: String,
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Deserialize, Serialize, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    PresignaturePending,
    #[default]
    Pending,
    Fulfilled,
    Cancelled,
    Expired,
}

/// A locally tracked order.
///
/// Assembled by the submission pipeline right after the order API accepts the
/// order; all later status transitions are owned by downstream state
/// tracking.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(flatten)]
    pub metadata: OrderMetadata,
    #[serde(flatten)]
    pub data: OrderData,
    #[serde(flatten)]
    pub signature: Signature,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMetadata {
    pub uid: OrderUid,
    pub owner: H160,
    /// Human readable description of the trade, e.g. for order lists.
    pub summary: String,
    pub input_token: TokenInfo,
    pub output_token: TokenInfo,
    pub status: OrderStatus,
    pub creation_date: DateTime<Utc>,
    /// The sell amount before the fee was deducted. Needed for later
    /// calculations on unfilled orders.
    #[serde(with = "u256_decimal")]
    pub sell_amount_before_fee: U256,
}

// uid as 56 bytes: 32 for the order digest, 20 for the owner address and 4
// for validTo.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct OrderUid(pub [u8; 56]);

impl OrderUid {
    /// Intended for easier uid creation in tests.
    pub fn from_integer(i: u32) -> Self {
        let mut uid = OrderUid::default();
        uid.0[0..4].copy_from_slice(&i.to_le_bytes());
        uid
    }

    /// Create a UID from its parts.
    pub fn from_parts(hash: H256, owner: H160, valid_to: u32) -> Self {
        let mut uid = [0; 56];
        uid[0..32].copy_from_slice(hash.as_bytes());
        uid[32..52].copy_from_slice(owner.as_bytes());
        uid[52..56].copy_from_slice(&valid_to.to_be_bytes());
        Self(uid)
    }

    /// Splits an order UID into its parts.
    pub fn parts(&self) -> (H256, H160, u32) {
        (
            H256::from_slice(&self.0[0..32]),
            H160::from_slice(&self.0[32..52]),
            u32::from_be_bytes(self.0[52..].try_into().unwrap()),
        )
    }
}

impl FromStr for OrderUid {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<OrderUid, hex::FromHexError> {
        let mut value = [0u8; 56];
        let s_without_prefix = s.strip_prefix("0x").unwrap_or(s);
        hex::decode_to_slice(s_without_prefix, value.as_mut())?;
        Ok(OrderUid(value))
    }
}

impl Display for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = [0u8; 2 + 56 * 2];
        bytes[..2].copy_from_slice(b"0x");
        // Unwrap because the length is always correct.
        hex::encode_to_slice(self.0, &mut bytes[2..]).unwrap();
        // Unwrap because the string is always valid utf8.
        let str = std::str::from_utf8(&bytes).unwrap();
        f.write_str(str)
    }
}

impl Debug for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Default for OrderUid {
    fn default() -> Self {
        Self([0u8; 56])
    }
}

impl Serialize for OrderUid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl<'de> Deserialize<'de> for OrderUid {
    fn deserialize<D>(deserializer: D) -> Result<OrderUid, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor {}
        impl de::Visitor<'_> for Visitor {
            type Value = OrderUid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "an uid with orderDigest_owner_validTo")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                OrderUid::from_str(s)
                    .map_err(|err| de::Error::custom(format!("invalid uid {s:?}: {err}")))
            }
        }

        deserializer.deserialize_str(Visitor {})
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    #[default]
    Buy,
    Sell,
}

impl OrderKind {
    // keccak256("sell")
    pub const SELL: [u8; 32] =
        hex!("f3b277728b3fee749481eb3e0b3b48980dbbab78658fc419025cb16eee346775");
    // keccak256("buy")
    pub const BUY: [u8; 32] =
        hex!("6ed88e868af0a1983e3886d5f3e95a2fafbd6c3450bc229e27342283dc429ccc");

    /// Returns the order kind as a string label that can be used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Source from which the sellAmount should be drawn upon order fulfillment.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SellTokenSource {
    /// Direct ERC20 allowances to the vault relayer contract
    #[default]
    Erc20,
    /// Internal balances to the vault with relayer approval
    Internal,
    /// ERC20 allowances to the vault with relayer approval
    External,
}

/// Destination to which the buyAmount should be transferred upon order
/// fulfillment.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum BuyTokenDestination {
    /// Pay trade proceeds as an ERC20 token transfer
    #[default]
    Erc20,
    /// Pay trade proceeds as a vault internal balance transfer
    Internal,
}
