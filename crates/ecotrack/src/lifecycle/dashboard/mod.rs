mod summary;
pub mod views;

pub use summary::{aggregate, summarize, DashboardSummary};
pub use views::{
    BucketCountEntry, CompanyDashboardView, CustomerDashboardView, ProductCardView,
};
