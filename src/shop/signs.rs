//! Sign types and their line formats.
//!
//! Each type maps to one format routine in [`SIGN_FORMATS`]; adding a sign type
//! means adding an enum variant and a table row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::economy::format_money;
use crate::shop::catalog::Catalog;
use crate::shop::errors::ShopError;
use crate::shop::location::LocationKey;
use crate::shop::parse::{parse_item, parse_owner, parse_price};
use crate::types::{AccountId, Player};

pub const LINE_COUNT: usize = 4;

const TAG_LINE: usize = 0;
const PRICE_LINE: usize = 1;
const ITEM_LINE: usize = 2;
const OWNER_LINE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignType {
    Buy,
    Sell,
    Free,
    Heal,
}

impl SignType {
    pub const ALL: [SignType; 4] = [SignType::Buy, SignType::Sell, SignType::Free, SignType::Heal];

    pub fn tag(self) -> &'static str {
        match self {
            SignType::Buy => "BUY",
            SignType::Sell => "SELL",
            SignType::Free => "FREE",
            SignType::Heal => "HEAL",
        }
    }

    /// Accepts `BUY`, `buy` or `[Buy]`.
    pub fn from_tag(text: &str) -> Option<SignType> {
        let trimmed = text.trim();
        let bare = trimmed
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();
        SignType::ALL
            .into_iter()
            .find(|sign| sign.tag().eq_ignore_ascii_case(bare))
    }

    fn format_routine(self) -> Option<FormatFn> {
        SIGN_FORMATS
            .iter()
            .find(|(sign, _)| *sign == self)
            .map(|(_, routine)| *routine)
    }

    /// Fill `draft` from the sign's lines, or explain why the sign is unusable.
    pub fn format(self, draft: &mut ShopDraft, input: &FormatInput<'_>) -> Result<(), ShopError> {
        let routine = self
            .format_routine()
            .ok_or_else(|| ShopError::UnknownSignType(self.tag().to_string()))?;
        routine(draft, input)
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Everything a format routine may read.
pub struct FormatInput<'a> {
    pub lines: &'a [Option<String>; LINE_COUNT],
    pub actor: &'a Player,
    pub catalog: &'a dyn Catalog,
    pub default_namespace: &'a str,
}

impl FormatInput<'_> {
    fn line(&self, index: usize) -> Result<&str, ShopError> {
        self.lines[index]
            .as_deref()
            .ok_or(ShopError::MissingLine(index))
    }
}

/// Shop fields accumulated while a sign is being built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopDraft {
    pub owner_id: Option<AccountId>,
    pub owner_display: String,
    pub item_id: Option<String>,
    pub stack_size: u32,
    pub price: i64,
}

type FormatFn = fn(&mut ShopDraft, &FormatInput<'_>) -> Result<(), ShopError>;

const SIGN_FORMATS: &[(SignType, FormatFn)] = &[
    (SignType::Buy, format_trade),
    (SignType::Sell, format_trade),
    (SignType::Free, format_free),
    (SignType::Heal, format_heal),
];

fn apply_owner(draft: &mut ShopDraft, input: &FormatInput<'_>) {
    // A blank owner line still means "me".
    let text = input.lines[OWNER_LINE].as_deref().unwrap_or_default();
    let owner = parse_owner(text, input.actor);
    draft.owner_id = Some(owner.id);
    draft.owner_display = owner.display;
}

fn apply_item(draft: &mut ShopDraft, input: &FormatInput<'_>) -> Result<(), ShopError> {
    let (stack_size, item_id) = parse_item(
        input.line(ITEM_LINE)?,
        input.default_namespace,
        input.catalog,
    )?;
    draft.stack_size = stack_size;
    draft.item_id = Some(item_id);
    Ok(())
}

// BUY / SELL: price, item, owner
fn format_trade(draft: &mut ShopDraft, input: &FormatInput<'_>) -> Result<(), ShopError> {
    draft.price = parse_price(input.line(PRICE_LINE)?)?;
    apply_item(draft, input)?;
    apply_owner(draft, input);
    Ok(())
}

// FREE: item, owner
fn format_free(draft: &mut ShopDraft, input: &FormatInput<'_>) -> Result<(), ShopError> {
    draft.price = 0;
    apply_item(draft, input)?;
    apply_owner(draft, input);
    Ok(())
}

// HEAL: price, owner
fn format_heal(draft: &mut ShopDraft, input: &FormatInput<'_>) -> Result<(), ShopError> {
    draft.price = parse_price(input.line(PRICE_LINE)?)?;
    apply_owner(draft, input);
    Ok(())
}

/// A validated, committed shop sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSign {
    pub location: LocationKey,
    pub sign_type: SignType,
    pub owner_id: AccountId,
    pub owner_display: String,
    pub item_id: Option<String>,
    pub stack_size: u32,
    pub price: i64,
}

impl ShopSign {
    pub fn from_draft(location: LocationKey, sign_type: SignType, draft: ShopDraft, actor: &Player) -> Self {
        Self {
            location,
            sign_type,
            owner_id: draft.owner_id.unwrap_or(actor.id),
            owner_display: draft.owner_display,
            item_id: draft.item_id,
            stack_size: draft.stack_size,
            price: draft.price,
        }
    }

    /// Text the finished sign shows, line by line.
    pub fn rendered_lines(&self, currency_symbol: &str) -> [String; LINE_COUNT] {
        let mut lines: [String; LINE_COUNT] = Default::default();
        lines[TAG_LINE] = format!("[{}]", self.sign_type.tag());
        if self.sign_type != SignType::Free {
            lines[PRICE_LINE] = format_money(self.price, currency_symbol);
        }
        if let Some(item) = &self.item_id {
            lines[ITEM_LINE] = format!("{} {}", self.stack_size, item);
        }
        lines[OWNER_LINE] = self.owner_display.clone();
        lines
    }
}
