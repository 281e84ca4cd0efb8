use super::domain::{LifecycleStatus, ProductRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleBucket {
    Active,
    InTransit,
    Completed,
}

impl LifecycleBucket {
    pub const fn ordered() -> [Self; 3] {
        [Self::Active, Self::InTransit, Self::Completed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::InTransit => "In Transit",
            Self::Completed => "Completed",
        }
    }
}

/// The two grouping rules used by the dashboards.
///
/// They disagree only on `Collected`: the company view counts it as still in transit,
/// the customer view counts it as done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketScheme {
    #[default]
    Company,
    Customer,
}

impl BucketScheme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "company" => Some(Self::Company),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn bucket_for(self, status: Option<&LifecycleStatus>) -> LifecycleBucket {
        match status {
            None | Some(LifecycleStatus::Registered) | Some(LifecycleStatus::Active) => {
                LifecycleBucket::Active
            }
            Some(LifecycleStatus::PendingPickup) => LifecycleBucket::InTransit,
            Some(LifecycleStatus::Collected) => match self {
                Self::Company => LifecycleBucket::InTransit,
                Self::Customer => LifecycleBucket::Completed,
            },
            Some(LifecycleStatus::Processing) | Some(LifecycleStatus::Recycled) => {
                LifecycleBucket::Completed
            }
            // Unknown statuses are treated as still active.
            Some(LifecycleStatus::Unrecognized(_)) => LifecycleBucket::Active,
        }
    }
}

/// Products partitioned by bucket, each list in input order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classification<'a> {
    pub active: Vec<&'a ProductRecord>,
    pub in_transit: Vec<&'a ProductRecord>,
    pub completed: Vec<&'a ProductRecord>,
}

impl<'a> Classification<'a> {
    pub fn bucket(&self, bucket: LifecycleBucket) -> &[&'a ProductRecord] {
        match bucket {
            LifecycleBucket::Active => &self.active,
            LifecycleBucket::InTransit => &self.in_transit,
            LifecycleBucket::Completed => &self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.in_transit.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active and in-transit products, the ones whose reward is not yet earned.
    pub fn outstanding(&self) -> impl Iterator<Item = &'a ProductRecord> + '_ {
        self.active.iter().chain(self.in_transit.iter()).copied()
    }
}

pub fn classify(products: &[ProductRecord], scheme: BucketScheme) -> Classification<'_> {
    let mut classification = Classification::default();

    for product in products {
        let target = match scheme.bucket_for(product.status.as_ref()) {
            LifecycleBucket::Active => &mut classification.active,
            LifecycleBucket::InTransit => &mut classification.in_transit,
            LifecycleBucket::Completed => &mut classification.completed,
        };
        target.push(product);
    }

    classification
}
