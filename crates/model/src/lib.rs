//! Data model shared by the signing, API client and trade crates: orders,
//! signatures and the typed data domain they are scoped to.

pub mod app_id;
pub mod bytes_hex;
pub mod domain;
pub mod order;
pub mod signature;
pub mod u256_decimal;

pub use {
    app_id::AppId,
    domain::{domain, DomainSeparator, TypedDataDomain, UnsupportedNetworkError},
    order::{
        Order, OrderCancellation, OrderCreation, OrderData, OrderKind, OrderMetadata, OrderStatus,
        OrderUid, TokenInfo,
    },
    signature::{EcdsaSignature, EcdsaSigningScheme, Signature, SigningScheme},
};
