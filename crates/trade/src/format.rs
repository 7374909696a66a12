//! Display formatting for order summaries.

use model::u256_decimal::format_units;
use primitive_types::{H160, U256};

/// Fractional digits shown for token amounts in summaries.
const AMOUNT_PRECISION: usize = 6;

/// Formats a base unit amount for display: at most [`AMOUNT_PRECISION`]
/// fractional digits, trailing zeros trimmed.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let units = format_units(amount, decimals as usize);
    match units.split_once('.') {
        None => units,
        Some((integer, fraction)) => {
            let fraction = &fraction[..fraction.len().min(AMOUNT_PRECISION)];
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{integer}.{fraction}")
            }
        }
    }
}

/// Shortens an address for display, keeping the first and last four hex
/// characters: `0x1234...abcd`.
pub fn shorten_address(address: H160) -> String {
    let full = format!("{address:#x}");
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_amounts_without_fraction() {
        let amount = U256::from(5u64) * U256::exp10(18);
        assert_eq!(format_amount(amount, 18), "5");
        assert_eq!(format_amount(U256::zero(), 18), "0");
        assert_eq!(format_amount(U256::from(42u64), 0), "42");
    }

    #[test]
    fn trims_and_truncates_fractions() {
        assert_eq!(format_amount(U256::from(1_337_000u64), 6), "1.337");
        assert_eq!(format_amount(U256::from(1u64), 6), "0.000001");
        // 1.234567891... gets cut at six fractional digits.
        let amount = U256::from(1_234_567_891_234_567_891u64);
        assert_eq!(format_amount(amount, 18), "1.234567");
    }

    #[test]
    fn shortens_addresses() {
        let address = H160([0xab; 20]);
        assert_eq!(shorten_address(address), "0xabab...abab");
    }
}
