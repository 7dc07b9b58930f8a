use super::*;
use crate::*;
use tracing::debug;

impl Run {
    pub(super) fn enter_shop(&mut self) -> Result<(), RunError> {
        let depth = self.depth();
        let shop = ShopState::generate(
            &self.config.shop,
            &self.config.jokers,
            &mut self.stock,
            depth,
            &mut self.rng,
        );
        let offers = shop.jokers.len() + usize::from(shop.upgrade.is_some());
        self.shop = Some(shop);
        self.phase = Phase::InShop;
        self.events.push(Event::ShopEntered { offers });
        Ok(())
    }

    /// Buys the offered joker with `id`. A purchase ends the shop visit.
    pub fn buy_joker(&mut self, id: &str) -> Result<(), RunError> {
        self.require_phase("buy a joker", &[Phase::InShop])?;
        let offer = self
            .shop
            .as_ref()
            .and_then(|shop| shop.offer(id))
            .ok_or_else(|| RunError::SoldOut(id.to_string()))?;
        let def = self
            .config
            .joker(id)
            .ok_or_else(|| RunError::SoldOut(id.to_string()))?;
        if self.jokers.len() >= self.config.run.joker_slots {
            return Err(RunError::NoJokerSlots);
        }
        let price = offer.price;
        if price > self.money {
            return Err(RunError::InsufficientFunds {
                price,
                money: self.money,
            });
        }

        let owned = OwnedJoker::from_def(def, price, self.next_acquired);
        self.next_acquired += 1;
        self.money -= price;
        self.jokers.push(owned);
        if let Some(shop) = self.shop.as_mut() {
            shop.take_offer(id);
        }
        debug!(joker = id, price, money = self.money, "joker bought");
        self.events.push(Event::JokerBought {
            id: id.to_string(),
            price,
            money: self.money,
        });
        self.close_shop();
        Ok(())
    }

    /// Raises the level of the offered hand category. The shop stays open.
    pub fn upgrade_hand(&mut self) -> Result<HandCategory, RunError> {
        self.require_phase("upgrade a hand", &[Phase::InShop])?;
        let offer = self
            .shop
            .as_ref()
            .and_then(|shop| shop.upgrade)
            .ok_or_else(|| RunError::SoldOut("hand upgrade".to_string()))?;
        if offer.price > self.money {
            return Err(RunError::InsufficientFunds {
                price: offer.price,
                money: self.money,
            });
        }
        self.money -= offer.price;
        let level = self.hand_levels.entry(offer.category).or_insert(1);
        *level += 1;
        let level = *level;
        if let Some(shop) = self.shop.as_mut() {
            shop.upgrade = None;
        }
        debug!(category = %offer.category, level, "hand upgraded");
        self.events.push(Event::HandUpgraded {
            category: offer.category,
            level,
            money: self.money,
        });
        Ok(offer.category)
    }

    pub fn sell_joker(&mut self, index: usize) -> Result<i64, RunError> {
        self.require_phase("sell a joker", &[Phase::InShop])?;
        if index >= self.jokers.len() {
            return Err(RunError::InvalidJokerIndex);
        }
        let joker = self.jokers.remove(index);
        let value = sell_value(joker.price_paid);
        self.money += value;
        self.events.push(Event::JokerSold {
            id: joker.id,
            sell_value: value,
            money: self.money,
        });
        Ok(value)
    }

    pub fn leave_shop(&mut self) -> Result<(), RunError> {
        self.require_phase("leave the shop", &[Phase::InShop])?;
        self.close_shop();
        Ok(())
    }

    fn close_shop(&mut self) {
        self.shop = None;
        self.phase = Phase::AtNode;
        self.events.push(Event::ShopLeft);
    }
}
