//! Sign line parsers. Pure functions; the catalog is the only outside input.

use crate::shop::catalog::{is_valid_identifier, Catalog, CatalogEntry};
use crate::shop::errors::ShopError;
use crate::types::{AccountId, Player, SYSTEM_OWNER};

/// Owner resolved from the owner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: AccountId,
    /// Text rendered on the sign; empty for server shops.
    pub display: String,
}

/// Parse `<count> <item name>` into a stack size and canonical item id.
///
/// The name is lower-cased with spaces turned into underscores and gets
/// `default_namespace` when it has none. The id must resolve to a real item.
pub fn parse_item(
    text: &str,
    default_namespace: &str,
    catalog: &dyn Catalog,
) -> Result<(u32, String), ShopError> {
    let invalid = || ShopError::InvalidItem(text.to_string());

    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, rest) = text.split_at(digits_end);
    if digits.is_empty() || !rest.starts_with(char::is_whitespace) {
        return Err(invalid());
    }
    let stack_size: u32 = digits.parse().map_err(|_| invalid())?;

    let name = rest.trim_start().replace(' ', "_").to_lowercase();
    let identifier = if name.contains(':') {
        name
    } else {
        format!("{}:{}", default_namespace, name)
    };
    if !is_valid_identifier(&identifier) {
        return Err(invalid());
    }

    match catalog.resolve(&identifier) {
        CatalogEntry::Item(id) => Ok((stack_size, id)),
        CatalogEntry::Empty => Err(invalid()),
    }
}

/// Parse a price such as `$150` or `200`.
pub fn parse_price(text: &str) -> Result<i64, ShopError> {
    let digits = text.strip_prefix('$').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ShopError::InvalidPrice(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| ShopError::InvalidPrice(text.to_string()))
}

/// Resolve the owner line. Only a privileged player can hand a shop to the server.
pub fn parse_owner(text: &str, actor: &Player) -> Owner {
    if text.trim().eq_ignore_ascii_case("server") && actor.privileged {
        Owner {
            id: SYSTEM_OWNER,
            display: String::new(),
        }
    } else {
        Owner {
            id: actor.id,
            display: actor.name.clone(),
        }
    }
}
