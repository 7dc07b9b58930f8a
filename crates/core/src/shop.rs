use crate::{HandCategory, JokerDef, JokerRarity, RngState, ShopRule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JokerOffer {
    pub id: String,
    pub name: String,
    pub rarity: JokerRarity,
    pub price: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UpgradeOffer {
    pub category: HandCategory,
    pub price: i64,
}

/// Copies of each catalog joker the shops may still offer over the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockPool {
    remaining: BTreeMap<String, u32>,
}

impl StockPool {
    pub fn from_catalog(catalog: &[JokerDef]) -> Self {
        Self {
            remaining: catalog
                .iter()
                .map(|joker| (joker.id.clone(), joker.stock))
                .collect(),
        }
    }

    pub fn remaining(&self, id: &str) -> u32 {
        self.remaining.get(id).copied().unwrap_or(0)
    }

    fn take(&mut self, id: &str) -> bool {
        match self.remaining.get_mut(id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopState {
    pub jokers: Vec<JokerOffer>,
    pub upgrade: Option<UpgradeOffer>,
}

impl ShopState {
    /// Rolls the offers for one visit. Offered jokers leave the stock pool
    /// whether or not they are bought.
    pub fn generate(
        rule: &ShopRule,
        catalog: &[JokerDef],
        stock: &mut StockPool,
        depth: u8,
        rng: &mut RngState,
    ) -> Self {
        let mut jokers: Vec<JokerOffer> = Vec::with_capacity(rule.offer_slots);
        for _ in 0..rule.offer_slots {
            let weights: Vec<u32> = JokerRarity::ALL
                .iter()
                .map(|rarity| {
                    if candidates(catalog, &*stock, *rarity, &jokers).is_empty() {
                        return 0;
                    }
                    rule.rarity_weights
                        .iter()
                        .filter(|entry| entry.rarity == *rarity)
                        .map(|entry| entry.weight_at(depth))
                        .sum()
                })
                .collect();
            let Some(rarity_idx) = rng.pick_weighted(&weights) else {
                break;
            };
            let pool = candidates(catalog, stock, JokerRarity::ALL[rarity_idx], &jokers);
            let Some(pick) = rng.index(pool.len()) else {
                break;
            };
            let def = pool[pick];
            let offer = JokerOffer {
                id: def.id.clone(),
                name: def.name.clone(),
                rarity: def.rarity,
                price: def.price,
            };
            stock.take(&offer.id);
            jokers.push(offer);
        }

        let upgrade = rng
            .index(HandCategory::ALL.len())
            .map(|idx| UpgradeOffer {
                category: HandCategory::ALL[idx],
                price: rule.upgrade_price,
            });
        Self { jokers, upgrade }
    }

    pub fn offer(&self, id: &str) -> Option<&JokerOffer> {
        self.jokers.iter().find(|offer| offer.id == id)
    }

    pub(crate) fn take_offer(&mut self, id: &str) -> Option<JokerOffer> {
        let idx = self.jokers.iter().position(|offer| offer.id == id)?;
        Some(self.jokers.remove(idx))
    }
}

fn candidates<'a>(
    catalog: &'a [JokerDef],
    stock: &StockPool,
    rarity: JokerRarity,
    offered: &[JokerOffer],
) -> Vec<&'a JokerDef> {
    catalog
        .iter()
        .filter(|joker| joker.rarity == rarity && stock.remaining(&joker.id) > 0)
        .filter(|joker| offered.iter().all(|offer| offer.id != joker.id))
        .collect()
}

/// Half the purchase price, never less than 1.
pub fn sell_value(price_paid: i64) -> i64 {
    (price_paid.max(0) / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default_jokers;

    #[test]
    fn offers_are_distinct_and_come_from_the_catalog() {
        let catalog = default_jokers();
        let rule = ShopRule::default();
        for seed in 0..100 {
            let mut stock = StockPool::from_catalog(&catalog);
            let mut rng = RngState::from_seed(seed);
            let shop = ShopState::generate(&rule, &catalog, &mut stock, 3, &mut rng);
            assert_eq!(shop.jokers.len(), 2);
            assert_ne!(shop.jokers[0].id, shop.jokers[1].id);
            for offer in &shop.jokers {
                let def = catalog.iter().find(|joker| joker.id == offer.id).unwrap();
                assert_eq!(offer.price, def.price);
                assert_eq!(stock.remaining(&def.id), def.stock - 1);
            }
            assert_eq!(shop.upgrade.map(|offer| offer.price), Some(4));
        }
    }

    #[test]
    fn exhausted_stock_is_never_offered() {
        let mut catalog = default_jokers();
        catalog.truncate(1);
        catalog[0].stock = 1;
        let rule = ShopRule::default();
        let mut stock = StockPool::from_catalog(&catalog);
        let mut rng = RngState::from_seed(8);
        let first = ShopState::generate(&rule, &catalog, &mut stock, 0, &mut rng);
        assert_eq!(first.jokers.len(), 1);
        let second = ShopState::generate(&rule, &catalog, &mut stock, 0, &mut rng);
        assert!(second.jokers.is_empty());
    }

    #[test]
    fn take_offer_removes_it() {
        let mut shop = ShopState {
            jokers: vec![JokerOffer {
                id: "moon".to_string(),
                name: "Moon Joker".to_string(),
                rarity: JokerRarity::Rare,
                price: 8,
            }],
            upgrade: None,
        };
        assert!(shop.take_offer("moon").is_some());
        assert!(shop.offer("moon").is_none());
        assert!(shop.take_offer("moon").is_none());
    }

    #[test]
    fn sell_value_halves_with_a_floor_of_one() {
        assert_eq!(sell_value(8), 4);
        assert_eq!(sell_value(5), 2);
        assert_eq!(sell_value(1), 1);
        assert_eq!(sell_value(0), 1);
    }
}
