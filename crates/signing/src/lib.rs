//! Obtaining order and cancellation signatures from heterogeneous wallets.
//!
//! The connected wallet is an opaque external agent: which signing methods it
//! implements can only be discovered by attempting them. This crate drives a
//! bounded cascade of candidate methods, classifies the failures wallets
//! return, and handles smart contract wallets that cannot sign off-chain at
//! all.

pub mod cascade;
pub mod failure;
pub mod payload;
pub mod sign;
pub mod wallet;

pub use {
    cascade::{sign_payload, SigningError, SigningMethod},
    payload::Payload,
    sign::{sign_order, sign_order_cancellation},
    wallet::{MockWalletSigner, TypedData, TypedDataMethod, WalletError, WalletSigner},
};
