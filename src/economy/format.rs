/// Money display and player-facing error text.
use crate::economy::errors::EconomyError;

/// Format an amount with thousands separators, e.g. `$1,234` or `-$50`.
pub fn format_money(amount: i64, symbol: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}{}", symbol, grouped)
    } else {
        format!("{}{}", symbol, grouped)
    }
}

/// Message shown to the player whose command failed.
pub fn describe_error(err: &EconomyError) -> String {
    match err {
        EconomyError::NotFound(_) | EconomyError::MissingField { .. } => {
            "Could not find data on that player (Maybe they haven't joined the server?).".to_string()
        }
        EconomyError::InsufficientFunds { .. } => "You do not have enough money.".to_string(),
        EconomyError::InvalidAmount(amount) => format!("{} is not a valid amount.", amount),
        EconomyError::BalanceOverflow(_) => "That balance would be too large.".to_string(),
        EconomyError::PermissionDenied(_) => {
            "You do not have permission to use that command.".to_string()
        }
        EconomyError::EconomyDisabled => "Money is disabled on this server.".to_string(),
        EconomyError::CompensationFailed { .. } => {
            "Something went wrong with that payment. Please contact a server operator.".to_string()
        }
        EconomyError::Sled(_)
        | EconomyError::Bincode(_)
        | EconomyError::Io(_)
        | EconomyError::SchemaMismatch { .. } => {
            "The ledger is unavailable right now. Please try again later.".to_string()
        }
    }
}
