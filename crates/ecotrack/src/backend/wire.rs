//! Request and response shapes exchanged with the backends.

use crate::lifecycle::domain::{deserialize_price, LifecycleStatus, NewCompanyProduct, ProductRecord};
use crate::lifecycle::pickup::{PickupRequest, PickupStatus};
use crate::lifecycle::reward::{round_currency, RewardQuote, RewardSource};
use crate::session::{Role, Session};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer taking ownership of a scanned product.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRequest {
    pub email: String,
    pub rfid: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub rfid: String,
    pub status: LifecycleStatus,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkStatusUpdate {
    pub email: String,
    pub rfids: Vec<String>,
    pub status: LifecycleStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardRequest {
    pub material: String,
    pub price: Decimal,
    pub manufacture_date: Option<NaiveDate>,
    pub added_date: DateTime<Utc>,
}

impl RewardRequest {
    /// Reward request for a product, or `None` when it has no price to reward.
    pub fn for_product(product: &ProductRecord, added_date: DateTime<Utc>) -> Option<Self> {
        product.price.map(|price| Self {
            material: product.material.clone(),
            price,
            manufacture_date: product.manufacture_date,
            added_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Credentials {
    Customer { email: String, password: String },
    Company { email: String, password: String },
    Admin { admin_id: String, password: String },
}

impl Credentials {
    pub fn role(&self) -> Role {
        match self {
            Self::Customer { .. } => Role::Customer,
            Self::Company { .. } => Role::Company,
            Self::Admin { .. } => Role::Admin,
        }
    }

    /// The identity the user typed, used when the auth service does not echo one back.
    pub fn submitted_identity(&self) -> &str {
        match self {
            Self::Customer { email, .. } | Self::Company { email, .. } => email,
            Self::Admin { admin_id, .. } => admin_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "companyName")]
    pub company_name: String,
    #[serde(rename = "registrationNumber")]
    pub registration_number: String,
}

/// A company as listed by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAccount {
    #[serde(alias = "_id", alias = "companyId", alias = "company_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "companyName", alias = "company_name", default)]
    pub company_name: String,
    #[serde(
        rename = "registrationNumber",
        alias = "registration_number",
        default
    )]
    pub registration_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Generic `{status, message, detail}` reply to a mutating call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    #[serde(
        default,
        alias = "pickup_id",
        alias = "_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl Acknowledgement {
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("success"))
    }

    /// `detail`, else `message`, else `fallback`.
    pub fn reason(&self, fallback: &str) -> String {
        describe_detail(self.detail.as_ref())
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Human-readable text from a FastAPI-style `detail`, which is either a string or a
/// list of validation errors.
pub(crate) fn describe_detail(detail: Option<&serde_json::Value>) -> Option<String> {
    match detail? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .map(str::to_string)
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ClaimProductBody<'a> {
    pub(crate) email: &'a str,
    pub(crate) added_at: String,
    pub(crate) product_rfid: &'a str,
}

impl<'a> From<&'a ClaimRequest> for ClaimProductBody<'a> {
    fn from(request: &'a ClaimRequest) -> Self {
        Self {
            email: &request.email,
            added_at: request.added_at.to_rfc3339(),
            product_rfid: &request.rfid,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CompanyProductBody<'a> {
    pub(crate) company_email: &'a str,
    pub(crate) product_name: &'a str,
    pub(crate) category: &'a str,
    pub(crate) material: &'a str,
    pub(crate) size: &'a str,
    pub(crate) batch_no: &'a str,
    pub(crate) price: String,
    pub(crate) manufacture_date: String,
}

impl<'a> From<&'a NewCompanyProduct> for CompanyProductBody<'a> {
    fn from(product: &'a NewCompanyProduct) -> Self {
        Self {
            company_email: &product.company_email,
            product_name: &product.name,
            category: &product.category,
            material: &product.material,
            size: &product.size,
            batch_no: &product.batch_number,
            price: product
                .price
                .map(|price| price.to_string())
                .unwrap_or_default(),
            manufacture_date: product.manufacture_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RewardBody<'a> {
    pub(crate) material: &'a str,
    pub(crate) price: Decimal,
    pub(crate) manufacture_date: String,
    pub(crate) added_date: String,
}

impl<'a> From<&'a RewardRequest> for RewardBody<'a> {
    fn from(request: &'a RewardRequest) -> Self {
        Self {
            material: &request.material,
            price: request.price,
            manufacture_date: request
                .manufacture_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            added_date: request.added_date.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RewardResponse {
    #[serde(default)]
    pub(crate) material: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub(crate) price: Option<Decimal>,
    #[serde(default)]
    pub(crate) days_difference: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub(crate) reward_points: Option<Decimal>,
}

impl RewardResponse {
    pub(crate) fn into_quote(self, request: &RewardRequest) -> Result<RewardQuote, String> {
        let reward_points = self
            .reward_points
            .ok_or_else(|| "reward response is missing reward_points".to_string())?;
        let material = if self.material.is_empty() {
            request.material.clone()
        } else {
            self.material
        };

        Ok(RewardQuote {
            material,
            price: self.price.unwrap_or(request.price),
            reward_points: round_currency(reward_points),
            days_difference: self.days_difference,
            source: RewardSource::Backend,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusBody<'a> {
    pub(crate) rfid: &'a str,
    pub(crate) status: &'a str,
    pub(crate) email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkStatusBody<'a> {
    pub(crate) email: &'a str,
    pub(crate) rfids: &'a [String],
    pub(crate) status: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PickupStatusBody<'a> {
    pub(crate) pickup_id: &'a str,
    pub(crate) status: PickupStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompanyIdBody<'a> {
    #[serde(rename = "companyId")]
    pub(crate) company_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailLoginBody<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminLoginBody<'a> {
    #[serde(rename = "adminId")]
    pub(crate) admin_id: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductList {
    #[serde(default)]
    pub(crate) products: Vec<ProductRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductLookup {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) product: Option<ProductRecord>,
}

/// Pickup listings arrive either as a bare array or wrapped in `{pickups: [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PickupList {
    Bare(Vec<PickupRequest>),
    Wrapped {
        #[serde(default)]
        pickups: Vec<PickupRequest>,
    },
}

impl PickupList {
    pub(crate) fn into_vec(self) -> Vec<PickupRequest> {
        match self {
            Self::Bare(pickups) | Self::Wrapped { pickups } => pickups,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CompanyList {
    Bare(Vec<CompanyAccount>),
    Wrapped {
        #[serde(default)]
        companies: Vec<CompanyAccount>,
    },
}

impl CompanyList {
    pub(crate) fn into_vec(self) -> Vec<CompanyAccount> {
        match self {
            Self::Bare(companies) | Self::Wrapped { companies } => companies,
        }
    }
}

/// Login reply. The identity may be nested under the role name or sit at the top level.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) customer: Option<LoginIdentity>,
    #[serde(default)]
    pub(crate) company: Option<LoginIdentity>,
    #[serde(default)]
    pub(crate) admin: Option<LoginIdentity>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginIdentity {
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(rename = "adminId", alias = "admin_id", default)]
    pub(crate) admin_id: Option<String>,
}

impl LoginResponse {
    pub(crate) fn into_session(self, credentials: &Credentials) -> Session {
        let role = credentials.role();
        let echoed = match role {
            Role::Customer => self.customer.and_then(|who| who.email).or(self.email),
            Role::Company => self.company.and_then(|who| who.email).or(self.email),
            Role::Admin => self.admin.and_then(|who| who.admin_id),
        };
        let identity = echoed
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| credentials.submitted_identity().to_string());
        Session::new(identity, role)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_prefers_nested_identity() {
        let credentials = Credentials::Customer {
            email: "typed@example.com".into(),
            password: "pw".into(),
        };
        let response: LoginResponse = serde_json::from_value(json!({
            "customer": { "email": "canonical@example.com" },
            "email": "top@example.com"
        }))
        .expect("decodes");
        let session = response.into_session(&credentials);
        assert_eq!(session.identity(), "canonical@example.com");
        assert_eq!(session.role(), Role::Customer);
    }

    #[test]
    fn admin_login_falls_back_to_submitted_id() {
        let credentials = Credentials::Admin {
            admin_id: "admin_042".into(),
            password: "pw".into(),
        };
        let response: LoginResponse =
            serde_json::from_value(json!({ "admin": {} })).expect("decodes");
        assert_eq!(response.into_session(&credentials).identity(), "admin_042");

        let response: LoginResponse =
            serde_json::from_value(json!({ "admin": { "admin_id": "admin_007" } }))
                .expect("decodes");
        assert_eq!(response.into_session(&credentials).identity(), "admin_007");
    }

    #[test]
    fn acknowledgement_reason_prefers_detail() {
        let ack: Acknowledgement = serde_json::from_value(json!({
            "status": "error",
            "message": "generic",
            "detail": "Product already registered"
        }))
        .expect("decodes");
        assert!(!ack.is_success());
        assert_eq!(ack.reason("fallback"), "Product already registered");

        let ack: Acknowledgement =
            serde_json::from_value(json!({ "detail": [{ "msg": "field required" }, { "msg": "bad date" }] }))
                .expect("decodes");
        assert_eq!(ack.reason("fallback"), "field required; bad date");
        assert_eq!(Acknowledgement::default().reason("fallback"), "fallback");
    }

    #[test]
    fn company_product_body_uses_backend_field_names() {
        let product = NewCompanyProduct {
            company_email: "acme@example.com".into(),
            name: "Phone".into(),
            category: "Electronics".into(),
            material: "Glass".into(),
            size: "6.1".into(),
            batch_number: "BATCH002".into(),
            price: Some(Decimal::new(45000, 0)),
            manufacture_date: NaiveDate::from_ymd_opt(2025, 1, 5).expect("valid date"),
        };
        let body = serde_json::to_value(CompanyProductBody::from(&product)).expect("encodes");
        assert_eq!(
            body,
            json!({
                "company_email": "acme@example.com",
                "product_name": "Phone",
                "category": "Electronics",
                "material": "Glass",
                "size": "6.1",
                "batch_no": "BATCH002",
                "price": "45000",
                "manufacture_date": "2025-01-05"
            })
        );
    }

    #[test]
    fn reward_response_becomes_backend_quote() {
        let request = RewardRequest {
            material: "Metal".into(),
            price: Decimal::new(75000, 0),
            manufacture_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            added_date: Utc::now(),
        };
        let response: RewardResponse = serde_json::from_value(json!({
            "material": "Metal",
            "price": 75000,
            "days_difference": 40,
            "reward_points": 8612.345
        }))
        .expect("decodes");

        let quote = response.into_quote(&request).expect("quote");
        assert_eq!(quote.source, RewardSource::Backend);
        assert_eq!(quote.reward_points, Decimal::new(861235, 2));
        assert_eq!(quote.days_difference, Some(40));
    }

    #[test]
    fn pickup_list_accepts_both_shapes() {
        let bare: PickupList =
            serde_json::from_value(json!([{ "id": "1", "email": "a@example.com" }]))
                .expect("bare");
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: PickupList = serde_json::from_value(json!({
            "pickups": [{ "id": "1", "email": "a@example.com" }, { "id": "2", "email": "a@example.com" }]
        }))
        .expect("wrapped");
        assert_eq!(wrapped.into_vec().len(), 2);
    }
}
