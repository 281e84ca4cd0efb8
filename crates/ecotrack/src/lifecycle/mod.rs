//! Product lifecycle: status model, bucket classification, rewards, and the dashboards
//! built from them, plus the service and routes that drive them against the backend.

pub mod classifier;
pub mod dashboard;
pub mod domain;
pub mod import;
pub mod pickup;
pub mod reward;
pub mod router;
pub mod search;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{classify, BucketScheme, Classification, LifecycleBucket};
pub use dashboard::{summarize, CompanyDashboardView, CustomerDashboardView, DashboardSummary};
pub use domain::{LifecycleStatus, NewCompanyProduct, ProductRecord};
pub use import::{csv_template, ImportReport, ProductImportError, ProductImporter};
pub use pickup::{NewPickup, PickupRequest, PickupStatus};
pub use reward::{RewardPolicy, RewardQuote, RewardSource};
pub use router::{lifecycle_router, LifecycleState};
pub use service::{BulkImportOutcome, LifecycleService, LifecycleServiceError, ScannedProduct};
