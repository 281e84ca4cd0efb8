use super::error::BackendError;
use super::gateway::{AuthGateway, PickupGateway, ProductGateway};
use super::wire::{
    describe_detail, Acknowledgement, AdminLoginBody, BulkStatusBody, BulkStatusUpdate,
    ClaimProductBody, ClaimRequest, CompanyAccount, CompanyIdBody, CompanyList,
    CompanyProductBody, CompanyRegistration, Credentials, CustomerRegistration, EmailLoginBody,
    HealthStatus, LoginResponse, PickupList, PickupStatusBody, ProductList, ProductLookup,
    RewardBody, RewardRequest, RewardResponse, StatusBody, StatusUpdate,
};
use crate::config::BackendConfig;
use crate::lifecycle::domain::{LifecycleStatus, NewCompanyProduct, ProductRecord};
use crate::lifecycle::pickup::{NewPickup, PickupRequest, PickupStatus};
use crate::lifecycle::reward::RewardQuote;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Talks JSON over HTTP to the product service and the auth service.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    http: reqwest::Client,
    products_url: Url,
    auth_url: Url,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            products_url: parse_base(&config.products_url)?,
            auth_url: parse_base(&config.auth_url)?,
        })
    }

    fn products(&self, segments: &[&str]) -> Result<Url, BackendError> {
        join(&self.products_url, segments)
    }

    fn auth(&self, segments: &[&str]) -> Result<Url, BackendError> {
        join(&self.auth_url, segments)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        self.execute(self.http.request(Method::GET, url.clone()), &url)
            .await
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.execute(self.http.request(method, url.clone()).json(body), &url)
            .await
    }

    /// Send a mutation and turn a non-success acknowledgement into [`BackendError::Rejected`].
    async fn mutate<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<Acknowledgement, BackendError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let ack: Acknowledgement = self.execute(request, &url).await?;
        if ack.is_success() {
            Ok(ack)
        } else {
            let reason = ack.reason(fallback);
            warn!(url = %url, reason = %reason, "backend rejected request");
            Err(BackendError::Rejected(reason))
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(url = %url, status = status.as_u16(), "backend responded");

        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(
                error_message(&bytes).unwrap_or_else(|| url.path().to_string()),
            ));
        }
        if !status.is_success() {
            let message = error_message(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| BackendError::Decode(err.to_string()))
    }
}

fn parse_base(raw: &str) -> Result<Url, BackendError> {
    let url = Url::parse(raw).map_err(|_| BackendError::InvalidUrl(raw.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(BackendError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
fn join(base: &Url, segments: &[&str]) -> Result<Url, BackendError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BackendError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    describe_detail(value.get("detail"))
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
}

#[async_trait]
impl ProductGateway for HttpBackendClient {
    async fn products_by_owner(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError> {
        let mut url = self.products(&["get_products_by_email"])?;
        url.query_pairs_mut().append_pair("email", email);
        let list: ProductList = self.get(url).await?;
        Ok(list.products)
    }

    async fn products_by_company(&self, email: &str) -> Result<Vec<ProductRecord>, BackendError> {
        let list: ProductList = self
            .get(self.products(&["products_by_company", email])?)
            .await?;
        Ok(list.products)
    }

    async fn all_products(&self) -> Result<Vec<ProductRecord>, BackendError> {
        let list: ProductList = self.get(self.products(&["all_products"])?).await?;
        Ok(list.products)
    }

    async fn product_by_rfid(&self, rfid: &str) -> Result<Option<ProductRecord>, BackendError> {
        match self
            .get::<ProductLookup>(self.products(&["product_by_rfid", rfid])?)
            .await
        {
            Ok(lookup) => {
                let found = lookup
                    .status
                    .as_deref()
                    .map_or(true, |status| status.eq_ignore_ascii_case("success"));
                Ok(lookup.product.filter(|_| found))
            }
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn products_by_status(
        &self,
        email: &str,
        status: &LifecycleStatus,
    ) -> Result<Vec<ProductRecord>, BackendError> {
        let list: ProductList = self
            .get(self.products(&["products_by_status", email, status.label()])?)
            .await?;
        Ok(list.products)
    }

    async fn claim_product(&self, request: &ClaimRequest) -> Result<Acknowledgement, BackendError> {
        self.mutate(
            Method::POST,
            self.products(&["add_product"])?,
            Some(&ClaimProductBody::from(request)),
            "Failed to add product",
        )
        .await
    }

    async fn add_company_product(
        &self,
        product: &NewCompanyProduct,
    ) -> Result<Acknowledgement, BackendError> {
        self.mutate(
            Method::POST,
            self.products(&["add_product_company"])?,
            Some(&CompanyProductBody::from(product)),
            "Failed to add product",
        )
        .await
    }

    async fn calculate_reward(
        &self,
        request: &RewardRequest,
    ) -> Result<RewardQuote, BackendError> {
        let response: RewardResponse = self
            .send(
                Method::POST,
                self.products(&["calculate-reward", ""])?,
                &RewardBody::from(request),
            )
            .await?;
        response.into_quote(request).map_err(BackendError::Decode)
    }

    async fn update_status(&self, update: &StatusUpdate) -> Result<Acknowledgement, BackendError> {
        let body = StatusBody {
            rfid: &update.rfid,
            status: update.status.label(),
            email: &update.email,
        };
        self.mutate(
            Method::POST,
            self.products(&["update_product_status"])?,
            Some(&body),
            "Failed to update product status",
        )
        .await
    }

    async fn bulk_update_status(
        &self,
        update: &BulkStatusUpdate,
    ) -> Result<Acknowledgement, BackendError> {
        let body = BulkStatusBody {
            email: &update.email,
            rfids: &update.rfids,
            status: update.status.label(),
        };
        self.mutate(
            Method::POST,
            self.products(&["bulk_update_product_status"])?,
            Some(&body),
            "Failed to update product status",
        )
        .await
    }
}

#[async_trait]
impl PickupGateway for HttpBackendClient {
    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Acknowledgement, BackendError> {
        self.mutate(
            Method::POST,
            self.products(&["api", "pickups"])?,
            Some(pickup),
            "Failed to schedule pickup",
        )
        .await
    }

    async fn pickups_for(&self, email: &str) -> Result<Vec<PickupRequest>, BackendError> {
        let list: PickupList = self.get(self.products(&["api", "pickups", email])?).await?;
        Ok(list.into_vec())
    }

    async fn all_pickups(&self) -> Result<Vec<PickupRequest>, BackendError> {
        let list: PickupList = self.get(self.products(&["api", "pickups"])?).await?;
        Ok(list.into_vec())
    }

    async fn pickups_by_status(
        &self,
        status: PickupStatus,
    ) -> Result<Vec<PickupRequest>, BackendError> {
        let list: PickupList = self
            .get(self.products(&["api", "pickups", "status", status.label()])?)
            .await?;
        Ok(list.into_vec())
    }

    async fn update_pickup_status(
        &self,
        pickup_id: &str,
        status: PickupStatus,
    ) -> Result<Acknowledgement, BackendError> {
        self.mutate(
            Method::PUT,
            self.products(&["api", "pickups", pickup_id, "status"])?,
            Some(&PickupStatusBody { pickup_id, status }),
            "Failed to update pickup",
        )
        .await
    }

    async fn delete_pickup(&self, pickup_id: &str) -> Result<Acknowledgement, BackendError> {
        self.mutate::<()>(
            Method::DELETE,
            self.products(&["api", "pickups", pickup_id])?,
            None,
            "Failed to delete pickup",
        )
        .await
    }
}

#[async_trait]
impl AuthGateway for HttpBackendClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let attempt: Result<LoginResponse, BackendError> = match credentials {
            Credentials::Customer { email, password } => {
                self.send(
                    Method::POST,
                    self.auth(&["api", "auth", "customer", "login"])?,
                    &EmailLoginBody { email, password },
                )
                .await
            }
            Credentials::Company { email, password } => {
                self.send(
                    Method::POST,
                    self.auth(&["api", "auth", "company", "login"])?,
                    &EmailLoginBody { email, password },
                )
                .await
            }
            Credentials::Admin { admin_id, password } => {
                self.send(
                    Method::POST,
                    self.auth(&["api", "auth", "admin", "login"])?,
                    &AdminLoginBody { admin_id, password },
                )
                .await
            }
        };
        let response = attempt.map_err(|err| match err {
            BackendError::Status { status, message } if (400..500).contains(&status) => {
                BackendError::Rejected(message)
            }
            other => other,
        })?;
        debug!(role = %credentials.role(), "login accepted");
        Ok(response.into_session(credentials))
    }

    async fn register_customer(
        &self,
        registration: &CustomerRegistration,
    ) -> Result<Acknowledgement, BackendError> {
        self.send(
            Method::POST,
            self.auth(&["api", "auth", "customer", "register"])?,
            registration,
        )
        .await
    }

    async fn register_company(
        &self,
        registration: &CompanyRegistration,
    ) -> Result<Acknowledgement, BackendError> {
        self.send(
            Method::POST,
            self.auth(&["api", "auth", "company", "register"])?,
            registration,
        )
        .await
    }

    async fn pending_companies(&self) -> Result<Vec<CompanyAccount>, BackendError> {
        let list: CompanyList = self
            .get(self.auth(&["api", "admin", "companies", "pending"])?)
            .await?;
        Ok(list.into_vec())
    }

    async fn all_companies(&self) -> Result<Vec<CompanyAccount>, BackendError> {
        let list: CompanyList = self.get(self.auth(&["api", "admin", "companies"])?).await?;
        Ok(list.into_vec())
    }

    async fn verify_company(&self, company_id: &str) -> Result<Acknowledgement, BackendError> {
        self.send(
            Method::POST,
            self.auth(&["api", "admin", "companies", "verify"])?,
            &CompanyIdBody { company_id },
        )
        .await
    }

    async fn reject_company(&self, company_id: &str) -> Result<Acknowledgement, BackendError> {
        self.send(
            Method::POST,
            self.auth(&["api", "admin", "companies", "reject"])?,
            &CompanyIdBody { company_id },
        )
        .await
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        self.get(self.auth(&["health"])?).await
    }
}
