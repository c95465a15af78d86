//! Merchant tables loaded from YAML
//!
//! The bundled table ships with the crate; a user table with the same
//! layout may add merchants or replace bundled ones by name.

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::gate::Gate;
use crate::domain::{AdventureResult, MEAT};
use crate::error::{Result, SessionError};

const BUNDLED: &str = include_str!("../../data/coinmasters.yml");

/// YAML representation of a currency
#[derive(Debug, Clone, Deserialize)]
struct RawCurrency {
    name: String,
    #[serde(default)]
    count: i64,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: u32,
    name: String,
    price: Option<i64>,
    /// Charged in this currency instead of the merchant default
    currency: Option<String>,
    /// Explicit multi-currency cost
    #[serde(default)]
    costs: Vec<RawCurrency>,
    #[serde(default)]
    gates: Vec<Gate>,
}

#[derive(Debug, Deserialize)]
struct RawFailure {
    text: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawMerchant {
    name: String,
    path: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default = "default_action_field")]
    action_field: String,
    #[serde(default = "default_buy_action")]
    buy_action: String,
    #[serde(default = "default_item_field")]
    item_field: String,
    item_pattern: Option<String>,
    #[serde(default = "default_quantity_field")]
    quantity_field: Option<String>,
    quantity_pattern: Option<String>,
    token: String,
    balance_pattern: String,
    currency: String,
    #[serde(default = "default_success_marker")]
    success_marker: String,
    #[serde(default)]
    failure_markers: Vec<RawFailure>,
    #[serde(default)]
    gates: Vec<Gate>,
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    merchants: Vec<RawMerchant>,
}

fn default_action_field() -> String {
    "action".to_string()
}

fn default_buy_action() -> String {
    "buyitem".to_string()
}

fn default_item_field() -> String {
    "whichitem".to_string()
}

fn default_quantity_field() -> Option<String> {
    Some("quantity".to_string())
}

fn default_success_marker() -> String {
    "You acquire".to_string()
}

/// Build a currency result; "Meat" is the game currency, anything else an item
pub fn currency(name: &str, count: i64) -> AdventureResult {
    if name == MEAT {
        AdventureResult::meat(count)
    } else {
        AdventureResult::item(name, count)
    }
}

/// How an item is paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemCost {
    /// Price in the merchant's default currency
    Default(i64),
    /// Price in a different single currency
    Override(AdventureResult),
    /// Several currencies at once
    Explicit(Vec<AdventureResult>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinmasterItem {
    /// Value of the item-id field in purchase requests
    pub id: u32,
    pub name: String,
    pub cost: ItemCost,
    pub gates: Vec<Gate>,
}

/// A response text that means the merchant refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureMarker {
    pub text: String,
    pub message: String,
}

/// Immutable description of one merchant endpoint.
#[derive(Debug, Clone)]
pub struct CoinmasterConfig {
    pub name: String,
    pub path: String,
    /// Fields sent with every request
    pub fields: BTreeMap<String, String>,
    pub action_field: String,
    pub buy_action: String,
    pub item_field: String,
    pub item_pattern: Regex,
    /// None for merchants that sell one unit per request
    pub quantity_field: Option<String>,
    pub quantity_pattern: Option<Regex>,
    pub token: String,
    pub balance_pattern: Regex,
    /// Default currency, count 1
    pub currency: AdventureResult,
    pub success_marker: String,
    pub failure_markers: Vec<FailureMarker>,
    pub gates: Vec<Gate>,
    pub items: Vec<CoinmasterItem>,
}

impl CoinmasterConfig {
    pub fn item(&self, id: u32) -> Option<&CoinmasterItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_named(&self, name: &str) -> Option<&CoinmasterItem> {
        self.items.iter().find(|item| item.name.eq_ignore_ascii_case(name))
    }

    fn from_raw(raw: RawMerchant) -> Result<Self> {
        let item_pattern = match &raw.item_pattern {
            Some(pattern) => Regex::new(pattern)?,
            None => Regex::new(&format!(r"{}=(\d+)", regex::escape(&raw.item_field)))?,
        };
        let quantity_pattern = match (&raw.quantity_pattern, &raw.quantity_field) {
            (Some(pattern), _) => Some(Regex::new(pattern)?),
            (None, Some(field)) => Some(Regex::new(&format!(r"{}=(\d+)", regex::escape(field)))?),
            (None, None) => None,
        };
        let balance_pattern = Regex::new(&raw.balance_pattern)?;

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(raw.items.len());
        for item in raw.items {
            if !seen.insert(item.id) {
                return Err(SessionError::Data(format!(
                    "{}: duplicate item id {}",
                    raw.name, item.id
                )));
            }
            items.push(Self::convert_item(&raw.name, item)?);
        }

        Ok(Self {
            currency: currency(&raw.currency, 1),
            name: raw.name,
            path: raw.path,
            fields: raw.fields,
            action_field: raw.action_field,
            buy_action: raw.buy_action,
            item_field: raw.item_field,
            item_pattern,
            quantity_field: raw.quantity_field,
            quantity_pattern,
            token: raw.token,
            balance_pattern,
            success_marker: raw.success_marker,
            failure_markers: raw
                .failure_markers
                .into_iter()
                .map(|f| FailureMarker {
                    text: f.text,
                    message: f.message,
                })
                .collect(),
            gates: raw.gates,
            items,
        })
    }

    fn convert_item(merchant: &str, raw: RawItem) -> Result<CoinmasterItem> {
        let cost = match (raw.price, raw.currency, raw.costs.is_empty()) {
            (Some(price), None, true) if price > 0 => ItemCost::Default(price),
            (Some(price), Some(currency_name), true) if price > 0 => {
                ItemCost::Override(currency(&currency_name, price))
            }
            (None, None, false) if raw.costs.iter().all(|c| c.count > 0) => {
                ItemCost::Explicit(raw.costs.iter().map(|c| currency(&c.name, c.count)).collect())
            }
            _ => {
                return Err(SessionError::Data(format!(
                    "{}: item {} ({}) needs a positive price or a costs list",
                    merchant, raw.id, raw.name
                )));
            }
        };

        Ok(CoinmasterItem {
            id: raw.id,
            name: raw.name,
            cost,
            gates: raw.gates,
        })
    }
}

/// Every known merchant, shared read-only.
#[derive(Debug, Clone, Default)]
pub struct CoinmasterRegistry {
    merchants: Vec<Arc<CoinmasterConfig>>,
}

impl CoinmasterRegistry {
    /// Parse a YAML table
    pub fn from_yaml(content: &str) -> Result<Self> {
        let table: RawTable = serde_yaml::from_str(content)?;
        let merchants = table
            .merchants
            .into_iter()
            .map(|raw| CoinmasterConfig::from_raw(raw).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { merchants })
    }

    /// Load a YAML table from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// The table that ships with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_yaml(BUNDLED)
    }

    /// Bundled table plus an optional user table layered on top
    pub fn load(user_table: Option<&Path>) -> Result<Self> {
        let mut registry = Self::bundled()?;
        if let Some(path) = user_table {
            log::info!("Loading merchant table from {}", path.display());
            registry.merge(Self::from_file(path)?);
        }
        Ok(registry)
    }

    /// Add merchants from `other`, replacing any with the same name
    pub fn merge(&mut self, other: CoinmasterRegistry) {
        for merchant in other.merchants {
            match self
                .merchants
                .iter_mut()
                .find(|m| m.name.eq_ignore_ascii_case(&merchant.name))
            {
                Some(existing) => *existing = merchant,
                None => self.merchants.push(merchant),
            }
        }
    }

    /// Case-insensitive lookup by merchant name
    pub fn get(&self, name: &str) -> Option<Arc<CoinmasterConfig>> {
        self.merchants
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn merchants(&self) -> impl Iterator<Item = &Arc<CoinmasterConfig>> {
        self.merchants.iter()
    }

    pub fn len(&self) -> usize {
        self.merchants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merchants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SMALL: &str = r#"
merchants:
  - name: Test Shop
    path: shop.php
    fields:
      whichshop: test
    item_field: whichrow
    token: widget
    balance_pattern: "You have ([\\d,]+) widgets?"
    currency: widget
    items:
      - id: 1
        name: gizmo
        price: 3
      - id: 2
        name: doohickey
        price: 50
        currency: Meat
      - id: 3
        name: thingamajig
        costs:
          - name: widget
            count: 2
          - name: sprocket
            count: 1
"#;

    #[test]
    fn test_parse_small_table() {
        let registry = CoinmasterRegistry::from_yaml(SMALL).unwrap();
        let shop = registry.get("test shop").unwrap();

        assert_eq!(shop.action_field, "action");
        assert_eq!(shop.buy_action, "buyitem");
        assert_eq!(shop.quantity_field.as_deref(), Some("quantity"));
        assert_eq!(shop.currency, AdventureResult::item("widget", 1));
        assert_eq!(shop.success_marker, "You acquire");

        assert_eq!(shop.item(1).unwrap().cost, ItemCost::Default(3));
        assert_eq!(
            shop.item(2).unwrap().cost,
            ItemCost::Override(AdventureResult::meat(50))
        );
        assert_eq!(
            shop.item_named("THINGAMAJIG").unwrap().cost,
            ItemCost::Explicit(vec![
                AdventureResult::item("widget", 2),
                AdventureResult::item("sprocket", 1)
            ])
        );
    }

    #[test]
    fn test_derived_patterns() {
        let registry = CoinmasterRegistry::from_yaml(SMALL).unwrap();
        let shop = registry.get("Test Shop").unwrap();
        assert!(shop.item_pattern.is_match("shop.php?whichrow=12"));
        assert!(shop.quantity_pattern.as_ref().unwrap().is_match("quantity=4"));
    }

    #[test]
    fn test_item_without_price_rejected() {
        let yaml = SMALL.replace("        price: 3\n", "");
        let err = CoinmasterRegistry::from_yaml(&yaml).unwrap_err();
        assert!(matches!(err, SessionError::Data(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = SMALL.replace("id: 2", "id: 1");
        assert!(matches!(
            CoinmasterRegistry::from_yaml(&yaml),
            Err(SessionError::Data(_))
        ));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let yaml = SMALL.replace("You have ([\\\\d,]+) widgets?", "([");
        assert!(matches!(
            CoinmasterRegistry::from_yaml(&yaml),
            Err(SessionError::Regex(_))
        ));
    }

    #[test]
    fn test_bundled_table_loads() {
        let registry = CoinmasterRegistry::bundled().unwrap();
        assert!(registry.get("Isotope Smithery").is_some());
        assert!(registry.get("Cosmic Ray's Bazaar").is_some());
    }

    #[test]
    fn test_user_table_replaces_by_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coinmasters.yml");
        fs::write(&path, SMALL.replace("Test Shop", "Isotope Smithery")).unwrap();

        let bundled = CoinmasterRegistry::bundled().unwrap();
        let registry = CoinmasterRegistry::load(Some(&path)).unwrap();
        assert_eq!(registry.len(), bundled.len());
        assert_eq!(registry.get("Isotope Smithery").unwrap().token, "widget");
    }

    #[test]
    fn test_missing_user_table() {
        let err = CoinmasterRegistry::load(Some(Path::new("/nonexistent/coinmasters.yml"))).unwrap_err();
        assert!(matches!(err, SessionError::Io(_)));
    }
}
