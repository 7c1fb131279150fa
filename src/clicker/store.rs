use serde::Serialize;
use std::collections::HashSet;

/// One purchasable building from the game's store panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreItem {
    pub name: String,
    pub price: u64,
}

impl StoreItem {
    /// Parse a store entry such as `Grandma - 100` or `Factory - 3,000`.
    pub fn parse(text: &str) -> Option<Self> {
        let (name, price) = text.split_once('-')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            price: parse_money(price)?,
        })
    }
}

/// Build the catalog from the text of every `#store b` entry. The last entry
/// is not a building and is dropped; entries that do not parse are skipped.
pub fn catalog_from_entries(mut texts: Vec<String>) -> Vec<StoreItem> {
    texts.pop();
    texts
        .iter()
        .filter_map(|text| {
            let item = StoreItem::parse(text);
            if item.is_none() {
                tracing::debug!("Skipping store entry {:?}", text);
            }
            item
        })
        .collect()
}

/// Element id of the buy button for a store item.
pub fn buy_button_id(name: &str) -> String {
    format!("buy{}", name)
}

/// The name part of a store entry, used for greyed-out entries.
pub fn item_name(text: &str) -> Option<String> {
    let name = text.split('-').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Parse a counter that may use `,` as a thousands separator.
pub fn parse_money(text: &str) -> Option<u64> {
    let digits: String = text.trim().chars().filter(|c| *c != ',').collect();
    digits.parse().ok()
}

/// Greedy rule: the most expensive item that is not greyed out and that
/// `money` covers. Ties keep the item listed first.
pub fn choose_purchase<'a>(
    catalog: &'a [StoreItem],
    unavailable: &HashSet<String>,
    money: u64,
) -> Option<&'a StoreItem> {
    catalog
        .iter()
        .filter(|item| !unavailable.contains(&item.name) && item.price <= money)
        .fold(None, |best: Option<&StoreItem>, item| match best {
            Some(current) if current.price >= item.price => Some(current),
            _ => Some(item),
        })
}
