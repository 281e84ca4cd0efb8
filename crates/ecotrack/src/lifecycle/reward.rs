use super::domain::ProductRecord;
use crate::config::RewardConfig;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Whether a reward figure is the backend's answer or a local estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardSource {
    Backend,
    LocalEstimate,
}

impl RewardSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Backend => "Confirmed",
            Self::LocalEstimate => "Estimate",
        }
    }
}

/// Reward points for a single product. One point is one unit of currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardQuote {
    pub material: String,
    pub price: Decimal,
    pub reward_points: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_difference: Option<i64>,
    pub source: RewardSource,
}

impl RewardQuote {
    pub fn is_estimate(&self) -> bool {
        self.source == RewardSource::LocalEstimate
    }
}

/// Round to two decimal places, halves away from zero.
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Local reward rule.
///
/// The backend's date-aware calculation is authoritative; everything produced here is
/// labelled [`RewardSource::LocalEstimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RewardPolicy {
    flat_rate: Decimal,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::flat(RewardConfig::DEFAULT_FLAT_RATE)
    }
}

impl RewardPolicy {
    pub fn flat(rate: Decimal) -> Self {
        Self { flat_rate: rate }
    }

    pub fn from_config(config: &RewardConfig) -> Self {
        Self::flat(config.flat_rate)
    }

    /// Rate applied to a material. Every material currently earns the flat rate.
    pub fn rate_for(&self, _material: &str) -> Decimal {
        self.flat_rate
    }

    fn raw_reward(&self, material: &str, price: Option<Decimal>) -> Decimal {
        price
            .map(|price| price.saturating_mul(self.rate_for(material)))
            .unwrap_or(Decimal::ZERO)
    }

    /// Reward for one product, rounded for display.
    pub fn reward(
        &self,
        material: &str,
        price: Option<Decimal>,
        _manufacture_date: Option<NaiveDate>,
        _reference_date: NaiveDate,
    ) -> Decimal {
        round_currency(self.raw_reward(material, price))
    }

    pub fn reward_for(&self, product: &ProductRecord, reference_date: NaiveDate) -> Decimal {
        self.reward(
            &product.material,
            product.price,
            product.manufacture_date,
            reference_date,
        )
    }

    pub fn estimate(&self, product: &ProductRecord, reference_date: NaiveDate) -> RewardQuote {
        let days_difference = product
            .manufacture_date
            .map(|made| (reference_date - made).num_days());

        RewardQuote {
            material: product.material.clone(),
            price: product.price.unwrap_or(Decimal::ZERO),
            reward_points: self.reward_for(product, reference_date),
            days_difference,
            source: RewardSource::LocalEstimate,
        }
    }

    /// Sum of rewards over a set of products.
    ///
    /// Terms are added unrounded and the total is rounded once, so the result does not
    /// depend on iteration order. Sums past the decimal range saturate at
    /// `Decimal::MAX` (or `Decimal::MIN`).
    pub fn total<'p, I>(&self, products: I) -> Decimal
    where
        I: IntoIterator<Item = &'p ProductRecord>,
    {
        let sum = products
            .into_iter()
            .map(|product| self.raw_reward(&product.material, product.price))
            .fold(Decimal::ZERO, Decimal::saturating_add);
        round_currency(sum)
    }
}
