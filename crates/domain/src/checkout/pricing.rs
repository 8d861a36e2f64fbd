//! Deterministic pricing rules applied at submission.

use serde::{Deserialize, Serialize};

use crate::money::{Money, MoneyError};

/// The four audited price fields frozen onto an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub items_price: Money,
    pub shipping_price: Money,
    pub tax_price: Money,
    pub total_price: Money,
}

/// Shipping and tax rules for the storefront.
///
/// Shipping is free at or above the threshold, flat below it. Tax is a
/// fixed percentage of the items price, floored to minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    pub free_shipping_threshold: Money,
    pub flat_shipping_rate: Money,
    pub tax_rate_percent: u8,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::inr(500),
            flat_shipping_rate: Money::inr(50),
            tax_rate_percent: 5,
        }
    }
}

impl PricingPolicy {
    /// Prices an items total into the four audited fields.
    ///
    /// `total_price = items_price + shipping_price + tax_price` holds
    /// exactly by construction, in integer minor units.
    pub fn quote(&self, items_total: Money) -> Result<PriceBreakdown, MoneyError> {
        let free_shipping = items_total.currency() == self.free_shipping_threshold.currency()
            && items_total.amount() >= self.free_shipping_threshold.amount();

        let shipping_price = if free_shipping {
            Money::zero(items_total.currency())
        } else {
            self.flat_shipping_rate
        };

        let tax_price = items_total.percent(self.tax_rate_percent);
        let total_price = items_total.add(shipping_price)?.add(tax_price)?;

        Ok(PriceBreakdown {
            items_price: items_total,
            shipping_price,
            tax_price,
            total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_shipping_at_threshold() {
        let policy = PricingPolicy::default();
        let quote = policy.quote(Money::inr(500)).unwrap();
        assert!(quote.shipping_price.is_zero());
    }

    #[test]
    fn flat_rate_below_threshold() {
        let policy = PricingPolicy::default();
        let quote = policy.quote(Money::inr(499)).unwrap();
        assert_eq!(quote.shipping_price, Money::inr(50));
    }

    #[test]
    fn tax_is_percentage_of_items_price() {
        let policy = PricingPolicy::default();
        let quote = policy.quote(Money::inr(1000)).unwrap();
        assert_eq!(quote.tax_price, Money::inr(50));
    }

    #[test]
    fn total_is_exact_sum() {
        let policy = PricingPolicy::default();

        let quote = policy.quote(Money::inr(1000)).unwrap();
        assert_eq!(quote.items_price, Money::inr(1000));
        assert_eq!(quote.shipping_price, Money::inr(0));
        assert_eq!(quote.tax_price, Money::inr(50));
        assert_eq!(quote.total_price, Money::inr(1050));

        let quote = policy.quote(Money::inr(200)).unwrap();
        assert_eq!(
            quote.total_price,
            quote
                .items_price
                .add(quote.shipping_price)
                .unwrap()
                .add(quote.tax_price)
                .unwrap()
        );
    }
}
