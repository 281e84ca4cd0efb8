use super::super::classifier::LifecycleBucket;
use super::super::domain::ProductRecord;
use super::summary::DashboardSummary;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BucketCountEntry {
    pub bucket: LifecycleBucket,
    pub bucket_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCardView {
    pub rfid: String,
    pub name: String,
    pub category: String,
    pub material: String,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacture_date: Option<NaiveDate>,
}

impl From<&ProductRecord> for ProductCardView {
    fn from(product: &ProductRecord) -> Self {
        Self {
            rfid: product.rfid.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            material: product.material.clone(),
            status_label: product.status_label().to_string(),
            price: product.price,
            manufacture_date: product.manufacture_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDashboardView {
    pub registered_products: usize,
    pub pending_pickup: usize,
    pub collected: usize,
    pub earned_rewards: Decimal,
    pub pending_rewards: Decimal,
    pub products: Vec<ProductCardView>,
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDashboardView {
    pub total_products: usize,
    pub active_products: usize,
    pub in_market: usize,
    pub collected: usize,
    pub in_lifecycle: usize,
    pub recent_products: Vec<ProductCardView>,
    /// Products matching the current search, or every product when there is none.
    pub matching_products: Vec<ProductCardView>,
    pub summary: DashboardSummary,
}
