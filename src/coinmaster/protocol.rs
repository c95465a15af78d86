//! Generic merchant protocol
//!
//! One engine for every configured merchant: request building, balance
//! parsing, availability and purchase reconciliation are all driven by a
//! `CoinmasterConfig`.

use std::sync::Arc;

use super::config::{CoinmasterConfig, FailureMarker, ItemCost};
use super::gate::first_failure;
use crate::domain::{AdventureResult, Character, MEAT, Request, Response};
use crate::error::{Result, SessionError};
use crate::executor::{Action, ActionClass};
use crate::parser::parse_count;
use crate::session::Session;

/// Whether a purchase can be paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordability {
    Affordable,
    Unaffordable,
    /// The merchant balance is not known
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CoinmasterProtocol {
    config: Arc<CoinmasterConfig>,
}

impl CoinmasterProtocol {
    pub fn new(config: Arc<CoinmasterConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoinmasterConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Unit cost of an item; per-item overrides win over the default currency
    pub fn item_costs(&self, item_id: u32) -> Option<Vec<AdventureResult>> {
        let item = self.config.item(item_id)?;
        let costs = match &item.cost {
            ItemCost::Override(cost) => vec![cost.clone()],
            ItemCost::Explicit(costs) => costs.clone(),
            ItemCost::Default(price) => vec![self.config.currency.with_count(*price)],
        };
        Some(costs)
    }

    /// Build a purchase of `quantity` units of `item_id`.
    pub fn build_purchase(&self, item_id: u32, quantity: i64) -> Result<CoinmasterPurchase> {
        if quantity == 0 {
            return Err(SessionError::Validation("Zero is not a valid quantity.".to_string()));
        }
        if quantity < 0 {
            return Err(SessionError::Validation(format!(
                "{} is not a valid quantity.",
                quantity
            )));
        }

        let item = self.config.item(item_id).ok_or_else(|| {
            SessionError::Validation(format!("{} does not sell item {}.", self.config.name, item_id))
        })?;

        let mut request = self
            .config
            .fields
            .iter()
            .fold(Request::new(&self.config.path), |req, (k, v)| req.field(k, v))
            .field(&self.config.action_field, &self.config.buy_action)
            .field(&self.config.item_field, item_id.to_string());

        match &self.config.quantity_field {
            Some(field) => request = request.field(field, quantity.to_string()),
            None if quantity > 1 => {
                return Err(SessionError::Validation(format!(
                    "{} makes one {} per request.",
                    self.config.name, item.name
                )));
            }
            None => {}
        }

        let costs = self
            .item_costs(item_id)
            .unwrap_or_default()
            .iter()
            .map(|cost| cost.checked_scaled(quantity))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| SessionError::Validation(format!("{} is too many to buy.", quantity)))?;

        Ok(CoinmasterPurchase {
            config: Arc::clone(&self.config),
            item_id,
            item: AdventureResult::item(&item.name, quantity),
            costs,
            request,
        })
    }

    /// Balance shown on a merchant page; `None` means unknown, never zero
    pub fn parse_balance(&self, text: &str) -> Option<i64> {
        parse_balance(&self.config, text)
    }

    /// Check `costs` against the merchant balance and the character's holdings
    pub fn affordability(&self, character: &Character, balance: Option<i64>, costs: &[AdventureResult]) -> Affordability {
        let mut unknown = false;
        for cost in costs {
            let held = if cost.name == MEAT {
                Some(character.meat)
            } else if cost.name == self.config.token {
                balance
            } else {
                Some(character.item_count(&cost.name))
            };
            match held {
                None => unknown = true,
                Some(amount) if amount < cost.count() => return Affordability::Unaffordable,
                Some(_) => {}
            }
        }
        if unknown {
            Affordability::Unknown
        } else {
            Affordability::Affordable
        }
    }

    /// The merchant's own gates, ignoring items
    pub fn is_accessible(&self, character: &Character) -> bool {
        first_failure(&self.config.gates, character).is_none()
    }

    /// Why an item cannot be bought right now, if it cannot
    pub fn unavailable_reason(&self, item_id: u32, character: &Character) -> Option<String> {
        let Some(item) = self.config.item(item_id) else {
            return Some(format!("{} does not sell item {}", self.config.name, item_id));
        };
        if let Some(gate) = first_failure(&self.config.gates, character) {
            return Some(format!("{} requires {}", self.config.name, gate));
        }
        first_failure(&item.gates, character).map(|gate| format!("{} requires {}", item.name, gate))
    }

    /// Listed, and every merchant and item gate admits the character
    pub fn is_purchasable(&self, item_id: u32, character: &Character) -> bool {
        self.unavailable_reason(item_id, character).is_none()
    }

    /// Recover (item id, quantity) from a purchase URL for this merchant
    pub fn parse_request(&self, url: &str) -> Option<(u32, i64)> {
        if !url.starts_with(&self.config.path) {
            return None;
        }
        let identifies_merchant = self
            .config
            .fields
            .iter()
            .all(|(k, v)| url.contains(&format!("{}={}", k, v)));
        if !identifies_merchant {
            return None;
        }

        let item_id = self
            .config
            .item_pattern
            .captures(url)?
            .get(1)?
            .as_str()
            .parse()
            .ok()?;
        let quantity = self
            .config
            .quantity_pattern
            .as_ref()
            .and_then(|re| re.captures(url))
            .and_then(|caps| parse_count(&caps[1]))
            .unwrap_or(1);
        Some((item_id, quantity))
    }
}

fn parse_balance(config: &CoinmasterConfig, text: &str) -> Option<i64> {
    let caps = config.balance_pattern.captures(text)?;
    parse_count(caps.get(1)?.as_str())
}

/// A purchase ready to be dispatched by the executor.
#[derive(Debug, Clone)]
pub struct CoinmasterPurchase {
    config: Arc<CoinmasterConfig>,
    item_id: u32,
    item: AdventureResult,
    /// Total cost for the whole quantity
    costs: Vec<AdventureResult>,
    request: Request,
}

impl CoinmasterPurchase {
    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    pub fn item(&self) -> &AdventureResult {
        &self.item
    }

    pub fn costs(&self) -> &[AdventureResult] {
        &self.costs
    }

    pub fn merchant(&self) -> &str {
        &self.config.name
    }

    /// Deltas applied once the merchant confirms the sale
    pub fn post_condition(&self) -> Vec<AdventureResult> {
        self.costs
            .iter()
            .map(AdventureResult::negated)
            .chain(std::iter::once(self.item.clone()))
            .collect()
    }

    fn refusal(&self, text: &str) -> Option<&FailureMarker> {
        self.config.failure_markers.iter().find(|m| text.contains(&m.text))
    }
}

impl Action for CoinmasterPurchase {
    fn describe(&self) -> String {
        format!("{} from {}", self.item, self.config.name)
    }

    fn request(&self) -> Request {
        self.request.clone()
    }

    fn class(&self) -> ActionClass {
        ActionClass::Purchase
    }

    /// Apply the post-condition on success.
    ///
    /// The response narration is not parsed: the post-condition already
    /// accounts for the item received.
    fn reconcile(&self, response: &Response, session: &mut Session) -> Result<bool> {
        if let Some(marker) = self.refusal(&response.text) {
            return Err(SessionError::Rejected(marker.message.clone()));
        }

        let balance = parse_balance(&self.config, &response.text);

        if response.text.contains(&self.config.success_marker) {
            for delta in self.post_condition() {
                session.process_result(&delta);
            }
            session.set_balance(&self.config.name, balance);
            log::info!("Purchased {} from {}", self.item, self.config.name);
            return Ok(true);
        }

        match balance {
            Some(amount) => {
                session.set_balance(&self.config.name, Some(amount));
                log::warn!("{} did not complete the sale of {}", self.config.name, self.item);
                Ok(false)
            }
            None => Err(SessionError::UnknownBalance(format!(
                "{} did not show a {} balance",
                self.config.name, self.config.token
            ))),
        }
    }
}
