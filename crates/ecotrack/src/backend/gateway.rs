use super::error::BackendError;
use super::wire::{
    Acknowledgement, BulkStatusUpdate, ClaimRequest, CompanyAccount, CompanyRegistration,
    Credentials, CustomerRegistration, HealthStatus, RewardRequest, StatusUpdate,
};
use crate::lifecycle::domain::{LifecycleStatus, NewCompanyProduct, ProductRecord};
use crate::lifecycle::pickup::{NewPickup, PickupRequest, PickupStatus};
use crate::lifecycle::reward::RewardQuote;
use crate::session::Session;
use async_trait::async_trait;

/// Product catalogue, ownership, lifecycle status and reward calculation.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    async fn products_by_owner(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError>;

    async fn products_by_company(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError>;

    async fn all_products(&self) -> Result<Vec<ProductRecord>, BackendError>;

    /// `Ok(None)` when no product carries this tag.
    async fn product_by_rfid(&self, rfid: &str) -> Result<Option<ProductRecord>, BackendError>;

    async fn products_by_status(
        &self,
        email: &str,
        status: &LifecycleStatus,
    ) -> Result<Vec<ProductRecord>, BackendError>;

    async fn claim_product(&self, request: &ClaimRequest) -> Result<Acknowledgement, BackendError>;

    async fn add_company_product(
        &self,
        product: &NewCompanyProduct,
    ) -> Result<Acknowledgement, BackendError>;

    /// The authoritative, date-aware reward.
    async fn calculate_reward(&self, request: &RewardRequest)
        -> Result<RewardQuote, BackendError>;

    async fn update_status(&self, update: &StatusUpdate) -> Result<Acknowledgement, BackendError>;

    async fn bulk_update_status(
        &self,
        update: &BulkStatusUpdate,
    ) -> Result<Acknowledgement, BackendError>;
}

#[async_trait]
pub trait PickupGateway: Send + Sync {
    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Acknowledgement, BackendError>;

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupRequest>, BackendError>;

    async fn all_pickups(&self) -> Result<Vec<PickupRequest>, BackendError>;

    async fn pickups_by_status(
        &self,
        status: PickupStatus,
    ) -> Result<Vec<PickupRequest>, BackendError>;

    async fn update_pickup_status(
        &self,
        pickup_id: &str,
        status: PickupStatus,
    ) -> Result<Acknowledgement, BackendError>;

    async fn delete_pickup(&self, pickup_id: &str) -> Result<Acknowledgement, BackendError>;
}

/// Registration, login and company verification.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<Session, BackendError>;

    async fn register_customer(
        &self,
        registration: &CustomerRegistration,
    ) -> Result<Acknowledgement, BackendError>;

    async fn register_company(
        &self,
        registration: &CompanyRegistration,
    ) -> Result<Acknowledgement, BackendError>;

    async fn pending_companies(&self) -> Result<Vec<CompanyAccount>, BackendError>;

    async fn all_companies(&self) -> Result<Vec<CompanyAccount>, BackendError>;

    async fn verify_company(&self, company_id: &str) -> Result<Acknowledgement, BackendError>;

    async fn reject_company(&self, company_id: &str) -> Result<Acknowledgement, BackendError>;

    async fn health(&self) -> Result<HealthStatus, BackendError>;
}
