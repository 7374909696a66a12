//! Serialization of `U256` amounts as decimal strings, the representation the
//! order API uses for all token amounts.

use primitive_types::U256;
use serde::{de, Deserializer, Serializer};
use std::fmt;

pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor {}
    impl de::Visitor<'_> for Visitor {
        type Value = U256;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a u256 encoded as a decimal encoded string")
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            U256::from_dec_str(s).map_err(|err| {
                de::Error::custom(format!("failed to decode {s:?} as decimal u256: {err}"))
            })
        }
    }

    deserializer.deserialize_str(Visitor {})
}

/// Converts an amount of base units of an ERC20 token with the specified
/// number of decimals into its decimal representation as a string.
pub fn format_units(amount: U256, decimals: usize) -> String {
    let str_amount = amount.to_string();
    if decimals == 0 {
        str_amount
    } else if str_amount.len() <= decimals {
        format!("0.{:0>pad_left$}", str_amount, pad_left = decimals)
    } else {
        format!(
            "{}.{}",
            &str_amount[0..str_amount.len() - decimals],
            &str_amount[str_amount.len() - decimals..]
        )
    }
}
