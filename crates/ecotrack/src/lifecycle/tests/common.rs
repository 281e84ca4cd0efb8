use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::backend::{
    Acknowledgement, BackendError, BulkStatusUpdate, ClaimRequest, PickupGateway,
    ProductGateway, RewardRequest, StatusUpdate,
};
use crate::lifecycle::domain::{LifecycleStatus, NewCompanyProduct, ProductRecord};
use crate::lifecycle::pickup::{NewPickup, PickupRequest, PickupStatus};
use crate::lifecycle::reward::{RewardPolicy, RewardQuote, RewardSource};
use crate::lifecycle::service::LifecycleService;
use crate::session::{Role, Session};

pub(super) const CUSTOMER: &str = "dana@example.com";
pub(super) const COMPANY: &str = "acme@example.com";

pub(super) fn customer() -> Session {
    Session::new(CUSTOMER, Role::Customer)
}

pub(super) fn company() -> Session {
    Session::new(COMPANY, Role::Company)
}

pub(super) fn admin() -> Session {
    Session::new("admin_042", Role::Admin)
}

pub(super) fn product(rfid: &str, price: i64, status: &str) -> ProductRecord {
    let mut record = ProductRecord::new(rfid)
        .with_price(Decimal::new(price, 0))
        .with_status(LifecycleStatus::parse(status));
    record.name = format!("Product {rfid}");
    record.material = "Metal".to_string();
    record.manufacture_date = NaiveDate::from_ymd_opt(2025, 1, 1);
    record.company_email = COMPANY.to_string();
    record.owner_email = Some(CUSTOMER.to_string());
    record.transaction_id = Some(format!("txn-{rfid}"));
    record
}

pub(super) fn draft(name: &str) -> NewCompanyProduct {
    NewCompanyProduct {
        company_email: "someone-else@example.com".to_string(),
        name: name.to_string(),
        category: "Electronics".to_string(),
        material: "Metal".to_string(),
        size: "15".to_string(),
        batch_number: "BATCH001".to_string(),
        price: Some(Decimal::new(75000, 0)),
        manufacture_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date"),
    }
}

pub(super) fn build_service(backend: FakeBackend) -> (LifecycleService<FakeBackend>, Arc<FakeBackend>) {
    let backend = Arc::new(backend);
    let service = LifecycleService::new(backend.clone(), RewardPolicy::default());
    (service, backend)
}

fn success() -> Acknowledgement {
    Acknowledgement {
        status: Some("success".to_string()),
        ..Acknowledgement::default()
    }
}

/// In-memory stand-in for both backends. Records every mutation it receives.
#[derive(Default)]
pub(super) struct FakeBackend {
    pub(super) products: Mutex<Vec<ProductRecord>>,
    pub(super) pickups: Mutex<Vec<PickupRequest>>,
    pub(super) claims: Mutex<Vec<ClaimRequest>>,
    pub(super) added: Mutex<Vec<NewCompanyProduct>>,
    pub(super) status_updates: Mutex<Vec<StatusUpdate>>,
    pub(super) bulk_updates: Mutex<Vec<BulkStatusUpdate>>,
    pub(super) created_pickups: Mutex<Vec<NewPickup>>,
    pub(super) reward_points: Option<Decimal>,
    /// Product names the backend refuses to add.
    pub(super) refuse: Vec<String>,
    /// Product names whose add fails with a 503.
    pub(super) unavailable: Vec<String>,
}

impl FakeBackend {
    pub(super) fn with_products(products: Vec<ProductRecord>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    fn matching(&self, keep: impl Fn(&ProductRecord) -> bool) -> Vec<ProductRecord> {
        self.products
            .lock()
            .expect("products mutex poisoned")
            .iter()
            .filter(|product| keep(product))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProductGateway for FakeBackend {
    async fn products_by_owner(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError> {
        Ok(self.matching(|product| product.owner_email.as_deref() == Some(email)))
    }

    async fn products_by_company(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError> {
        Ok(self.matching(|product| product.company_email == email))
    }

    async fn all_products(&self) -> Result<Vec<ProductRecord>, BackendError> {
        Ok(self.matching(|_| true))
    }

    async fn product_by_rfid(&self, rfid: &str) -> Result<Option<ProductRecord>, BackendError> {
        Ok(self.matching(|product| product.rfid == rfid).into_iter().next())
    }

    async fn products_by_status(
        &self,
        email: &str,
        status: &LifecycleStatus,
    ) -> Result<Vec<ProductRecord>, BackendError> {
        Ok(self.matching(|product| {
            product.status.as_ref() == Some(status)
                && (product.owner_email.as_deref() == Some(email) || product.company_email == email)
        }))
    }

    async fn claim_product(&self, request: &ClaimRequest) -> Result<Acknowledgement, BackendError> {
        self.claims
            .lock()
            .expect("claims mutex poisoned")
            .push(request.clone());
        Ok(success())
    }

    async fn add_company_product(
        &self,
        product: &NewCompanyProduct,
    ) -> Result<Acknowledgement, BackendError> {
        if self.refuse.contains(&product.name) {
            return Err(BackendError::Rejected(format!(
                "{} already registered",
                product.name
            )));
        }
        if self.unavailable.contains(&product.name) {
            return Err(BackendError::Status {
                status: 503,
                message: "product service busy".to_string(),
            });
        }
        self.added
            .lock()
            .expect("added mutex poisoned")
            .push(product.clone());
        Ok(success())
    }

    async fn calculate_reward(&self, request: &RewardRequest) -> Result<RewardQuote, BackendError> {
        match self.reward_points {
            Some(reward_points) => Ok(RewardQuote {
                material: request.material.clone(),
                price: request.price,
                reward_points,
                days_difference: Some(30),
                source: RewardSource::Backend,
            }),
            None => Err(BackendError::Status {
                status: 503,
                message: "reward service down".to_string(),
            }),
        }
    }

    async fn update_status(&self, update: &StatusUpdate) -> Result<Acknowledgement, BackendError> {
        self.status_updates
            .lock()
            .expect("status mutex poisoned")
            .push(update.clone());
        Ok(success())
    }

    async fn bulk_update_status(
        &self,
        update: &BulkStatusUpdate,
    ) -> Result<Acknowledgement, BackendError> {
        self.bulk_updates
            .lock()
            .expect("bulk mutex poisoned")
            .push(update.clone());
        Ok(success())
    }
}

#[async_trait]
impl PickupGateway for FakeBackend {
    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Acknowledgement, BackendError> {
        self.created_pickups
            .lock()
            .expect("pickups mutex poisoned")
            .push(pickup.clone());
        Ok(success())
    }

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupRequest>, BackendError> {
        Ok(self
            .pickups
            .lock()
            .expect("pickups mutex poisoned")
            .iter()
            .filter(|pickup| pickup.email == email)
            .cloned()
            .collect())
    }

    async fn all_pickups(&self) -> Result<Vec<PickupRequest>, BackendError> {
        Ok(self.pickups.lock().expect("pickups mutex poisoned").clone())
    }

    async fn pickups_by_status(
        &self,
        status: PickupStatus,
    ) -> Result<Vec<PickupRequest>, BackendError> {
        Ok(self
            .pickups
            .lock()
            .expect("pickups mutex poisoned")
            .iter()
            .filter(|pickup| pickup.status == status)
            .cloned()
            .collect())
    }

    async fn update_pickup_status(
        &self,
        pickup_id: &str,
        status: PickupStatus,
    ) -> Result<Acknowledgement, BackendError> {
        let mut pickups = self.pickups.lock().expect("pickups mutex poisoned");
        let pickup = pickups
            .iter_mut()
            .find(|pickup| pickup.id == pickup_id)
            .ok_or_else(|| BackendError::NotFound(format!("pickup {pickup_id}")))?;
        pickup.status = status;
        Ok(success())
    }

    async fn delete_pickup(&self, pickup_id: &str) -> Result<Acknowledgement, BackendError> {
        let mut pickups = self.pickups.lock().expect("pickups mutex poisoned");
        let before = pickups.len();
        pickups.retain(|pickup| pickup.id != pickup_id);
        if pickups.len() == before {
            return Err(BackendError::NotFound(format!("pickup {pickup_id}")));
        }
        Ok(success())
    }
}

pub(super) fn pickup(id: &str, email: &str, status: PickupStatus) -> PickupRequest {
    PickupRequest {
        id: id.to_string(),
        email: email.to_string(),
        location: "12 Green Street".to_string(),
        preferred_date: Some("2025-07-01".to_string()),
        status,
    }
}
