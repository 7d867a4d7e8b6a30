use thiserror::Error;

/// Reasons a sign cannot become a shop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// Item line is not `<count> <item>` or names no known item.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// Price line is not a non-negative whole number.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// First line does not name a sign type.
    #[error("unknown sign type: {0}")]
    UnknownSignType(String),

    /// Sign type exists but is switched off.
    #[error("sign type disabled: {0}")]
    DisabledSignType(String),

    /// A line the sign type needs was never written.
    #[error("line {0} is empty")]
    MissingLine(usize),
}
