//! AR ↔ winston conversion.
//!
//! The ledger reports GraphQL quantities as decimal AR strings while the REST
//! history uses integer winston. Everything internal is winston so amount
//! checks stay integer-based.

/// Winston per AR.
pub const WINSTON_PER_AR: u128 = 1_000_000_000_000;

/// Fractional digits carried by one AR.
const AR_DECIMALS: usize = 12;

/// Fractional digits in a displayed amount.
const DISPLAY_DECIMALS: u32 = 6;

/// Parse a decimal AR string ("0.5", "12", "1.000000000001") into winston.
///
/// Returns `None` for negative, malformed, or overflowing input and for more
/// than 12 fractional digits that are not all zero.
pub fn ar_to_winston(ar: &str) -> Option<u128> {
    let ar = ar.trim();
    if ar.is_empty() || ar.starts_with('-') {
        return None;
    }
    let ar = ar.strip_prefix('+').unwrap_or(ar);

    let (whole, frac) = match ar.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (ar, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (significant, excess) = frac.split_at(frac.len().min(AR_DECIMALS));
    if excess.bytes().any(|b| b != b'0') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: u128 = if significant.is_empty() {
        0
    } else {
        let padding = 10u128.pow((AR_DECIMALS - significant.len()) as u32);
        significant.parse::<u128>().ok()? * padding
    };

    whole.checked_mul(WINSTON_PER_AR)?.checked_add(frac)
}

/// Render winston as AR with exactly six fractional digits, rounding half up.
pub fn format_ar(winston: u128) -> String {
    let step = WINSTON_PER_AR / 10u128.pow(DISPLAY_DECIMALS);
    let scaled = winston / step + u128::from(winston % step >= step / 2);
    let unit = 10u128.pow(DISPLAY_DECIMALS);
    format!(
        "{}.{:0width$}",
        scaled / unit,
        scaled % unit,
        width = DISPLAY_DECIMALS as usize
    )
}
