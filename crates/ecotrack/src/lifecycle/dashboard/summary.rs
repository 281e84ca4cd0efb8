use super::super::classifier::{classify, BucketScheme, Classification, LifecycleBucket};
use super::super::domain::{LifecycleStatus, ProductRecord};
use super::super::reward::RewardPolicy;
use super::super::search::search;
use super::views::{BucketCountEntry, CompanyDashboardView, CustomerDashboardView, ProductCardView};
use rust_decimal::Decimal;
use serde::Serialize;

/// Counters shown on both dashboards.
///
/// `total` always equals `active + in_transit + completed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub scheme: BucketScheme,
    pub total: usize,
    pub active: usize,
    pub in_transit: usize,
    pub completed: usize,
    pub earned_reward: Decimal,
    pub pending_reward: Decimal,
}

/// Build the summary from an existing classification of `products`.
pub fn aggregate(
    products: &[ProductRecord],
    classification: &Classification<'_>,
    scheme: BucketScheme,
    policy: &RewardPolicy,
) -> DashboardSummary {
    debug_assert_eq!(products.len(), classification.len());

    DashboardSummary {
        scheme,
        total: products.len(),
        active: classification.active.len(),
        in_transit: classification.in_transit.len(),
        completed: classification.completed.len(),
        earned_reward: policy.total(classification.completed.iter().copied()),
        pending_reward: policy.total(classification.outstanding()),
    }
}

/// Classify and aggregate in one step.
pub fn summarize(
    products: &[ProductRecord],
    scheme: BucketScheme,
    policy: &RewardPolicy,
) -> DashboardSummary {
    let classification = classify(products, scheme);
    aggregate(products, &classification, scheme, policy)
}

impl DashboardSummary {
    pub fn count(&self, bucket: LifecycleBucket) -> usize {
        match bucket {
            LifecycleBucket::Active => self.active,
            LifecycleBucket::InTransit => self.in_transit,
            LifecycleBucket::Completed => self.completed,
        }
    }

    pub fn bucket_counts(&self) -> Vec<BucketCountEntry> {
        LifecycleBucket::ordered()
            .into_iter()
            .map(|bucket| BucketCountEntry {
                bucket,
                bucket_label: bucket.label(),
                count: self.count(bucket),
            })
            .collect()
    }

    pub fn total_reward(&self) -> Decimal {
        self.earned_reward.saturating_add(self.pending_reward)
    }
}

impl CustomerDashboardView {
    pub fn build(products: &[ProductRecord], policy: &RewardPolicy) -> Self {
        let classification = classify(products, BucketScheme::Customer);
        let summary = aggregate(products, &classification, BucketScheme::Customer, policy);
        let pending_pickup = classification
            .in_transit
            .iter()
            .filter(|product| product.status == Some(LifecycleStatus::PendingPickup))
            .count();

        Self {
            registered_products: summary.active,
            pending_pickup,
            collected: summary.completed,
            earned_rewards: summary.earned_reward,
            pending_rewards: summary.pending_reward,
            products: products.iter().map(ProductCardView::from).collect(),
            summary,
        }
    }
}

impl CompanyDashboardView {
    /// Products shown in the overview panel.
    pub const RECENT_LIMIT: usize = 5;

    pub fn build(products: &[ProductRecord], policy: &RewardPolicy) -> Self {
        let summary = summarize(products, BucketScheme::Company, policy);
        let recent_products = products
            .iter()
            .take(Self::RECENT_LIMIT)
            .map(ProductCardView::from)
            .collect();

        Self {
            total_products: summary.total,
            active_products: summary.active,
            in_market: summary.in_transit,
            collected: summary.completed,
            in_lifecycle: summary.in_transit + summary.completed,
            recent_products,
            matching_products: products.iter().map(ProductCardView::from).collect(),
            summary,
        }
    }

    /// Narrow `matching_products` to `query`. Counters are unaffected.
    pub fn with_search(mut self, products: &[ProductRecord], query: &str) -> Self {
        self.matching_products = search(products, query)
            .into_iter()
            .map(ProductCardView::from)
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(rfid: &str, price: Option<i64>, status: Option<&str>) -> ProductRecord {
        let mut record = ProductRecord::new(rfid);
        record.price = price.map(|p| Decimal::new(p, 0));
        record.status = status.map(LifecycleStatus::parse);
        record
    }

    #[test]
    fn recycled_product_earns_full_reward() {
        let products = vec![product("a", Some(75000), Some("Recycled"))];
        let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.earned_reward, Decimal::new(900000, 2));
        assert_eq!(summary.pending_reward, Decimal::ZERO);
    }

    #[test]
    fn earned_and_pending_split_by_bucket() {
        let products = vec![
            product("a", Some(100), Some("Active")),
            product("b", Some(200), Some("Recycled")),
        ];
        let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.earned_reward, Decimal::new(2400, 2));
        assert_eq!(summary.pending_reward, Decimal::new(1200, 2));
        assert_eq!(summary.total_reward(), Decimal::new(36, 0));
    }

    #[test]
    fn unknown_status_counts_toward_pending() {
        let products = vec![product("a", Some(100), Some("UnknownValue"))];
        let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
        assert_eq!(summary.active, 1);
        assert_eq!(summary.pending_reward, Decimal::new(12, 0));
        assert_eq!(summary.earned_reward, Decimal::ZERO);
    }

    #[test]
    fn missing_price_still_counted() {
        let products = vec![
            product("a", None, Some("Recycled")),
            product("b", Some(50), Some("Processing")),
        ];
        let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.earned_reward, Decimal::new(6, 0));
    }

    #[test]
    fn bucket_counts_sum_to_total() {
        let products = vec![
            product("a", None, None),
            product("b", None, Some("Collected")),
            product("c", None, Some("Pending Pickup")),
            product("d", None, Some("Recycled")),
        ];
        let summary = summarize(&products, BucketScheme::Company, &RewardPolicy::default());
        let counted: usize = summary.bucket_counts().iter().map(|entry| entry.count).sum();
        assert_eq!(counted, summary.total);
        assert_eq!(summary.in_transit, 2);
    }

    #[test]
    fn customer_view_splits_pending_pickup_from_collected() {
        let products = vec![
            product("a", Some(100), Some("Registered")),
            product("b", Some(100), Some("Pending Pickup")),
            product("c", Some(100), Some("Collected")),
            product("d", Some(100), Some("Recycled")),
        ];
        let view = CustomerDashboardView::build(&products, &RewardPolicy::default());
        assert_eq!(view.registered_products, 1);
        assert_eq!(view.pending_pickup, 1);
        assert_eq!(view.collected, 2);
        assert_eq!(view.earned_rewards, Decimal::new(24, 0));
        assert_eq!(view.pending_rewards, Decimal::new(24, 0));
        assert_eq!(view.products.len(), 4);
    }

    #[test]
    fn company_view_limits_recent_products() {
        let products: Vec<_> = (0..8)
            .map(|i| product(&format!("rfid-{i}"), Some(10), Some("Collected")))
            .collect();
        let view = CompanyDashboardView::build(&products, &RewardPolicy::default());
        assert_eq!(view.total_products, 8);
        assert_eq!(view.in_market, 8);
        assert_eq!(view.collected, 0);
        assert_eq!(view.in_lifecycle, 8);
        assert_eq!(view.recent_products.len(), CompanyDashboardView::RECENT_LIMIT);
        assert_eq!(view.recent_products[0].rfid, "rfid-0");
        assert_eq!(view.matching_products.len(), 8);
    }

    #[test]
    fn company_search_narrows_only_the_product_list() {
        let mut laptop = product("rfid-1", Some(10), Some("Active"));
        laptop.name = "Laptop".into();
        let mut phone = product("rfid-2", Some(10), Some("Recycled"));
        phone.name = "Phone".into();
        let products = vec![laptop, phone];

        let view = CompanyDashboardView::build(&products, &RewardPolicy::default())
            .with_search(&products, "lap");
        assert_eq!(view.total_products, 2);
        assert_eq!(view.matching_products.len(), 1);
        assert_eq!(view.matching_products[0].name, "Laptop");
    }
}
