use crate::error::SessionError;
use crate::types::{NetworkFamily, TransactionRequest};
use crate::units;

/// Pallet targeted by Substrate native transfers.
pub const SUBSTRATE_TRANSFER_PALLET: &str = "balances";

/// Call within [`SUBSTRATE_TRANSFER_PALLET`] for native transfers.
pub const SUBSTRATE_TRANSFER_CALL: &str = "transfer";

/// Builds the native transfer payload for `family`.
///
/// `amount` is the human decimal entered by the user and is scaled by
/// `10^decimals` with truncation. The recipient is passed through as is; the
/// caller validates its format first.
///
/// This is the only place that decides payload shape per family.
pub fn build(
    family: NetworkFamily,
    recipient: &str,
    amount: &str,
    decimals: u8,
) -> Result<TransactionRequest, SessionError> {
    let value = units::parse_amount(amount, decimals)?;

    let request = match family {
        NetworkFamily::Evm => TransactionRequest::EvmTransfer {
            to: recipient.to_string(),
            value,
        },
        NetworkFamily::Substrate => TransactionRequest::SubstrateCall {
            method: SUBSTRATE_TRANSFER_PALLET.to_string(),
            params: vec![
                SUBSTRATE_TRANSFER_CALL.to_string(),
                recipient.to_string(),
                value,
            ],
        },
    };

    tracing::debug!(%family, "built transfer request");
    Ok(request)
}
