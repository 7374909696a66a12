//! Order submission and cancellation pipelines.
//!
//! Ties together the data model, the wallet signing cascade and the order
//! API client: callers hand over trade parameters plus handles to the wallet
//! and the API, and get back a fully signed, fully submitted order entity or
//! an error with nothing persisted.

use orderbook_api::OrderApiError;
use signing::SigningError;
use thiserror::Error;

pub mod cancellation;
pub mod format;
pub mod orders;

pub use {
    cancellation::{cancel_order, CancelOrderParams},
    orders::{sign_and_submit_order, PostOrderParams},
};

/// Fatal failure of a submission or cancellation. Everything recoverable has
/// already been absorbed by the signing cascade; whatever reaches the caller
/// is surfaced unchanged.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Api(#[from] OrderApiError),
}
