//! Clients for the external product and authentication services.
//!
//! The traits are the seam the service layer and tests depend on;
//! [`HttpBackendClient`] is the production implementation.

mod error;
mod gateway;
mod http;
pub mod wire;

pub use error::BackendError;
pub use gateway::{AuthGateway, PickupGateway, ProductGateway};
pub use http::HttpBackendClient;
pub use wire::{
    Acknowledgement, BulkStatusUpdate, ClaimRequest, CompanyAccount, CompanyRegistration,
    Credentials, CustomerRegistration, HealthStatus, RewardRequest, StatusUpdate,
};
