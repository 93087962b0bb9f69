//! Shared transaction submission path.
//!
//! Every state-changing call in the system goes through [`send_and_confirm`]:
//! price the transaction, estimate gas, submit, and block until the receipt
//! is observed. Retry policy lives here and applies only to the read-only
//! pricing steps; a submitted transaction is never re-sent.

use alloy_primitives::TxHash;
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use thiserror::Error;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::debug;

#[derive(Error, Debug)]
pub enum SubmitError {
    /// Gas price query failed
    #[error("gas price query failed: {0}")]
    GasPrice(String),

    /// Gas estimation failed
    #[error("gas estimation failed: {0}")]
    Estimate(String),

    /// Transaction submission failed
    #[error("transaction submission failed: {0}")]
    Send(String),

    /// The receipt was not observed; the transaction may still confirm later
    #[error("timed out waiting for receipt: {0}")]
    Receipt(String),
}

// Exponential backoff: 100ms, 200ms, 400ms (max 3 attempts)
fn retry_strategy() -> std::iter::Take<ExponentialBackoff> {
    ExponentialBackoff::from_millis(100).take(3)
}

/// Set an explicit gas price only when the node reports a usable one.
///
/// A reported price of exactly zero means "unknown"; the field is left unset
/// and the sending node supplies its own default.
fn apply_gas_price(tx: &mut TransactionRequest, gas_price: u128) {
    if gas_price > 0 {
        tx.gas_price = Some(gas_price);
    }
}

/// Add a 20% buffer on top of the node's gas estimate.
fn buffered_gas(estimate: u64) -> u64 {
    estimate + estimate / 5
}

/// Price, estimate, submit, and wait for inclusion.
///
/// Returns the hash of the confirmed transaction. RPC failures surface as
/// [`SubmitError`] variants naming the step that failed, so callers can tell
/// an infrastructure problem from a rejected call.
pub async fn send_and_confirm<P>(
    provider: &P,
    mut tx: TransactionRequest,
) -> Result<TxHash, SubmitError>
where
    P: Provider + Clone,
{
    let gas_price = Retry::spawn(retry_strategy(), || async {
        provider.get_gas_price().await
    })
    .await
    .map_err(|e| SubmitError::GasPrice(e.to_string()))?;

    apply_gas_price(&mut tx, gas_price);

    let estimate = Retry::spawn(retry_strategy(), || async {
        provider.estimate_gas(tx.clone()).await
    })
    .await
    .map_err(|e| SubmitError::Estimate(e.to_string()))?;

    tx.gas = Some(buffered_gas(estimate));

    debug!(
        gas = estimate,
        gas_price,
        to = ?tx.to,
        "submitting transaction"
    );

    let pending = provider
        .send_transaction(tx)
        .await
        .map_err(|e| SubmitError::Send(e.to_string()))?;

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| SubmitError::Receipt(e.to_string()))?;

    Ok(receipt.transaction_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_gas_price_is_omitted() {
        let mut tx = TransactionRequest::default();
        apply_gas_price(&mut tx, 0);
        assert_eq!(tx.gas_price, None);
    }

    #[test]
    fn test_nonzero_gas_price_is_applied() {
        let mut tx = TransactionRequest::default();
        apply_gas_price(&mut tx, 20_000_000_000);
        assert_eq!(tx.gas_price, Some(20_000_000_000));
    }

    #[test]
    fn test_gas_buffer() {
        assert_eq!(buffered_gas(100_000), 120_000);
        assert_eq!(buffered_gas(0), 0);
    }
}
