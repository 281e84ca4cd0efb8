use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::dashboard::{CompanyDashboardView, CustomerDashboardView};
use super::domain::{LifecycleStatus, NewCompanyProduct, ProductRecord};
use super::import::{ImportReport, RowError};
use super::pickup::{NewPickup, PickupRequest, PickupStatus};
use super::reward::{RewardPolicy, RewardQuote};
use crate::backend::{
    Acknowledgement, BackendError, BulkStatusUpdate, ClaimRequest, PickupGateway,
    ProductGateway, RewardRequest, StatusUpdate,
};
use crate::session::{Role, Session, SessionError};

/// Roles allowed to move products through the lifecycle.
const STATUS_EDITORS: [Role; 2] = [Role::Company, Role::Admin];

/// A product looked up by its tag, with the reward it would earn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedProduct {
    pub product: ProductRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedProduct {
    pub name: String,
    pub reason: String,
    /// The backend failure was transient; resubmitting this product may succeed.
    pub retryable: bool,
}

/// Result of pushing an [`ImportReport`] to the backend one product at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkImportOutcome {
    pub added: Vec<String>,
    pub failed: Vec<FailedProduct>,
    pub rejected_rows: Vec<RowError>,
}

impl BulkImportOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.rejected_rows.is_empty()
    }
}

/// Role-checked product and pickup operations on top of the backend gateways.
///
/// Every operation takes the acting [`Session`] explicitly. On failure nothing is cached,
/// so retrying is just calling again.
pub struct LifecycleService<G> {
    gateway: Arc<G>,
    policy: RewardPolicy,
}

impl<G> LifecycleService<G>
where
    G: ProductGateway + PickupGateway + 'static,
{
    pub fn new(gateway: Arc<G>, policy: RewardPolicy) -> Self {
        Self { gateway, policy }
    }

    pub async fn customer_dashboard(
        &self,
        session: &Session,
    ) -> Result<CustomerDashboardView, LifecycleServiceError> {
        let email = session.require(Role::Customer)?;
        let products = self.gateway.products_by_owner(email).await?;
        Ok(CustomerDashboardView::build(&products, &self.policy))
    }

    pub async fn company_dashboard(
        &self,
        session: &Session,
        search: Option<&str>,
    ) -> Result<CompanyDashboardView, LifecycleServiceError> {
        let email = session.require(Role::Company)?;
        let products = self.gateway.products_by_company(email).await?;
        let view = CompanyDashboardView::build(&products, &self.policy);
        Ok(match search {
            Some(query) => view.with_search(&products, query),
            None => view,
        })
    }

    /// Every product visible to the session: owned, issued, or (for an admin) all of them.
    pub async fn products(
        &self,
        session: &Session,
    ) -> Result<Vec<ProductRecord>, LifecycleServiceError> {
        let products = match session.role() {
            Role::Customer => self.gateway.products_by_owner(session.identity()).await?,
            Role::Company => self.gateway.products_by_company(session.identity()).await?,
            Role::Admin => self.gateway.all_products().await?,
        };
        Ok(products)
    }

    /// Products owned by (customer) or issued by (company) the session holder in `status`.
    pub async fn products_with_status(
        &self,
        session: &Session,
        status: &LifecycleStatus,
    ) -> Result<Vec<ProductRecord>, LifecycleServiceError> {
        let email = session.require_any(&[Role::Customer, Role::Company])?;
        Ok(self.gateway.products_by_status(email, status).await?)
    }

    /// Look up a tag and price its reward.
    ///
    /// The backend quote is preferred. When that call fails the local estimate is
    /// returned instead, labelled as such.
    pub async fn scan_product(
        &self,
        session: &Session,
        rfid: &str,
        now: DateTime<Utc>,
    ) -> Result<ScannedProduct, LifecycleServiceError> {
        session.require(Role::Customer)?;
        let product = self.find_product(rfid).await?;

        let reward = match RewardRequest::for_product(&product, now) {
            Some(request) => Some(self.quote_or_estimate(&product, &request).await),
            None => None,
        };

        Ok(ScannedProduct { product, reward })
    }

    async fn quote_or_estimate(
        &self,
        product: &ProductRecord,
        request: &RewardRequest,
    ) -> RewardQuote {
        match self.gateway.calculate_reward(request).await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(
                    rfid = %product.rfid,
                    error = %err,
                    retryable = err.is_retryable(),
                    "reward service failed; using local estimate"
                );
                self.policy
                    .estimate(product, request.added_date.date_naive())
            }
        }
    }

    /// Authoritative reward from the backend, without any fallback.
    pub async fn quote_reward(
        &self,
        request: &RewardRequest,
    ) -> Result<RewardQuote, LifecycleServiceError> {
        Ok(self.gateway.calculate_reward(request).await?)
    }

    pub async fn claim_product(
        &self,
        session: &Session,
        rfid: &str,
        now: DateTime<Utc>,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        let email = session.require(Role::Customer)?;
        let product = self.find_product(rfid).await?;
        if !product.is_claimable() {
            return Err(LifecycleServiceError::NotClaimable(product.rfid));
        }

        let ack = self
            .gateway
            .claim_product(&ClaimRequest {
                email: email.to_string(),
                rfid: product.rfid.clone(),
                added_at: now,
            })
            .await?;
        info!(rfid = %product.rfid, email, "product claimed");
        Ok(ack)
    }

    /// Register a product for the company in `session`. The draft's company email is
    /// replaced by the session identity.
    pub async fn add_company_product(
        &self,
        session: &Session,
        mut product: NewCompanyProduct,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        let email = session.require(Role::Company)?;
        product.company_email = email.to_string();
        let ack = self.gateway.add_company_product(&product).await?;
        info!(name = %product.name, email, "company product added");
        Ok(ack)
    }

    /// Push every valid draft in `report`. One failing product does not stop the rest.
    pub async fn import_products(
        &self,
        session: &Session,
        report: ImportReport,
    ) -> Result<BulkImportOutcome, LifecycleServiceError> {
        session.require(Role::Company)?;
        let mut outcome = BulkImportOutcome {
            rejected_rows: report.rejected,
            ..BulkImportOutcome::default()
        };

        for product in report.products {
            let name = product.name.clone();
            match self.add_company_product(session, product).await {
                Ok(_) => outcome.added.push(name),
                Err(LifecycleServiceError::Backend(err)) => {
                    let retryable = err.is_retryable();
                    warn!(name = %name, error = %err, retryable, "bulk import item failed");
                    outcome.failed.push(FailedProduct {
                        name,
                        reason: err.to_string(),
                        retryable,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            added = outcome.added.len(),
            failed = outcome.failed.len(),
            rejected = outcome.rejected_rows.len(),
            "bulk import finished"
        );
        Ok(outcome)
    }

    pub async fn update_status(
        &self,
        session: &Session,
        rfid: &str,
        status: LifecycleStatus,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        let email = session.require_any(&STATUS_EDITORS)?;
        let update = StatusUpdate {
            rfid: rfid.to_string(),
            status,
            email: email.to_string(),
        };
        let ack = self.gateway.update_status(&update).await?;
        info!(rfid, status = %update.status, "product status updated");
        Ok(ack)
    }

    pub async fn bulk_update_status(
        &self,
        session: &Session,
        rfids: Vec<String>,
        status: LifecycleStatus,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        let email = session.require_any(&STATUS_EDITORS)?;
        if rfids.is_empty() {
            return Err(LifecycleServiceError::NothingSelected);
        }
        let update = BulkStatusUpdate {
            email: email.to_string(),
            rfids,
            status,
        };
        let ack = self.gateway.bulk_update_status(&update).await?;
        info!(count = update.rfids.len(), status = %update.status, "bulk status update");
        Ok(ack)
    }

    pub async fn request_pickup(
        &self,
        session: &Session,
        location: String,
        preferred_date: Option<NaiveDate>,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        let email = session.require(Role::Customer)?;
        let pickup = NewPickup {
            email: email.to_string(),
            location,
            preferred_date,
        };
        let ack = self.gateway.create_pickup(&pickup).await?;
        info!(email, "pickup requested");
        Ok(ack)
    }

    /// A customer sees their own pickups, an admin sees all of them.
    pub async fn pickups(
        &self,
        session: &Session,
    ) -> Result<Vec<PickupRequest>, LifecycleServiceError> {
        let identity = session.require_any(&[Role::Customer, Role::Admin])?;
        let pickups = match session.role() {
            Role::Customer => self.gateway.pickups_for(identity).await?,
            _ => self.gateway.all_pickups().await?,
        };
        Ok(pickups)
    }

    pub async fn pickups_by_status(
        &self,
        session: &Session,
        status: PickupStatus,
    ) -> Result<Vec<PickupRequest>, LifecycleServiceError> {
        session.require(Role::Admin)?;
        Ok(self.gateway.pickups_by_status(status).await?)
    }

    pub async fn update_pickup_status(
        &self,
        session: &Session,
        pickup_id: &str,
        status: PickupStatus,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        session.require(Role::Admin)?;
        let ack = self
            .gateway
            .update_pickup_status(pickup_id, status)
            .await?;
        info!(pickup_id, status = status.label(), "pickup status updated");
        Ok(ack)
    }

    pub async fn delete_pickup(
        &self,
        session: &Session,
        pickup_id: &str,
    ) -> Result<Acknowledgement, LifecycleServiceError> {
        session.require(Role::Admin)?;
        let ack = self.gateway.delete_pickup(pickup_id).await?;
        info!(pickup_id, "pickup deleted");
        Ok(ack)
    }

    async fn find_product(&self, rfid: &str) -> Result<ProductRecord, LifecycleServiceError> {
        self.gateway
            .product_by_rfid(rfid)
            .await?
            .ok_or_else(|| LifecycleServiceError::ProductNotFound(rfid.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("no product with RFID '{0}'")]
    ProductNotFound(String),
    #[error("product '{0}' has no transaction and cannot be claimed")]
    NotClaimable(String),
    #[error("select at least one product")]
    NothingSelected,
}
