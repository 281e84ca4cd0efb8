use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Where a product is in its recycling journey.
///
/// Transitions happen on the backend (company or admin actions). This crate only reads
/// the current value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LifecycleStatus {
    Registered,
    Active,
    PendingPickup,
    Collected,
    Processing,
    Recycled,
    /// A status string outside the known set, kept verbatim.
    Unrecognized(String),
}

impl LifecycleStatus {
    pub fn known() -> [Self; 6] {
        [
            Self::Registered,
            Self::Active,
            Self::PendingPickup,
            Self::Collected,
            Self::Processing,
            Self::Recycled,
        ]
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Registered" => Self::Registered,
            "Active" => Self::Active,
            "Pending Pickup" => Self::PendingPickup,
            "Collected" => Self::Collected,
            "Processing" => Self::Processing,
            "Recycled" => Self::Recycled,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Registered => "Registered",
            Self::Active => "Active",
            Self::PendingPickup => "Pending Pickup",
            Self::Collected => "Collected",
            Self::Processing => "Processing",
            Self::Recycled => "Recycled",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for LifecycleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for LifecycleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A product as returned by the product backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub rfid: String,
    #[serde(rename = "product_name", default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "batch_no", default)]
    pub batch_number: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub added_at: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub created_at: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub company_email: String,
    #[serde(rename = "email", default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(rename = "TXN", default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(rename = "currentStatus", default)]
    pub status: Option<LifecycleStatus>,
}

impl ProductRecord {
    /// Minimal record, mostly useful for fixtures and offline summaries.
    pub fn new(rfid: impl Into<String>) -> Self {
        Self {
            rfid: rfid.into(),
            name: String::new(),
            category: String::new(),
            material: String::new(),
            size: String::new(),
            batch_number: String::new(),
            manufacture_date: None,
            added_at: None,
            created_at: None,
            price: None,
            company_email: String::new(),
            owner_email: None,
            transaction_id: None,
            status: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_status(mut self, status: LifecycleStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The status shown to users; an unset status reads as `Active`.
    pub fn status_label(&self) -> &str {
        self.status
            .as_ref()
            .map(LifecycleStatus::label)
            .unwrap_or("Active")
    }

    pub fn is_claimable(&self) -> bool {
        self.transaction_id
            .as_deref()
            .is_some_and(|txn| !txn.trim().is_empty())
    }
}

/// Product details a company submits when issuing a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompanyProduct {
    pub company_email: String,
    pub name: String,
    pub category: String,
    pub material: String,
    pub size: String,
    pub batch_number: String,
    pub price: Option<Decimal>,
    pub manufacture_date: NaiveDate,
}

/// Parse a calendar date from either a plain date or a timestamp.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    // Timestamps without an offset, e.g. `2025-01-05T10:00:00.123456`.
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|dt| dt.date())
}

/// Parse a price that may arrive as a number or as text.
pub fn parse_price(value: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map(Some)
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(parse_calendar_date))
}

/// Serde adapter for prices sent as a number, a numeric string, `""`, or `null`.
pub fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(number) => parse_price(&number.to_string())
            .map_err(|err| serde::de::Error::custom(format!("invalid price {number}: {err}"))),
        serde_json::Value::String(text) => parse_price(&text)
            .map_err(|err| serde::de::Error::custom(format!("invalid price '{text}': {err}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected price as number or string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_parse_round_trips_known_labels() {
        for status in LifecycleStatus::known() {
            assert_eq!(LifecycleStatus::parse(status.label()), status);
        }
    }

    #[test]
    fn status_parse_keeps_unknown_values() {
        let status = LifecycleStatus::parse("UnknownValue");
        assert_eq!(status, LifecycleStatus::Unrecognized("UnknownValue".into()));
        assert_eq!(status.label(), "UnknownValue");
    }

    #[test]
    fn price_decodes_from_numbers_and_strings() {
        let cases = [
            (json!(75000), Some(Decimal::new(75000, 0))),
            (json!("75000"), Some(Decimal::new(75000, 0))),
            (json!("75000.50"), Some(Decimal::new(7500050, 2))),
            (json!(99.5), Some(Decimal::new(995, 1))),
            (json!(null), None),
            (json!(""), None),
        ];

        for (price, expected) in cases {
            let product: ProductRecord =
                serde_json::from_value(json!({ "rfid": "RFID-1", "price": price }))
                    .expect("product decodes");
            assert_eq!(product.price, expected, "price {price}");
        }
    }

    #[test]
    fn price_rejects_non_numeric_text() {
        let result: Result<ProductRecord, _> =
            serde_json::from_value(json!({ "rfid": "RFID-1", "price": "cheap" }));
        assert!(result.is_err());
    }

    #[test]
    fn product_decodes_backend_payload() {
        let product: ProductRecord = serde_json::from_value(json!({
            "_id": "665f",
            "TXN": "TXN-778",
            "company_email": "acme@example.com",
            "product_name": "Laptop",
            "category": "Electronics",
            "material": "Metal",
            "size": "15",
            "batch_no": "BATCH001",
            "manufacture_date": "2025-01-01",
            "rfid": "RFID-0001",
            "created_at": "2025-01-02T08:30:00.123456",
            "added_at": "2025-03-04T10:00:00Z",
            "price": "75000",
            "currentStatus": "Pending Pickup"
        }))
        .expect("decodes");

        assert_eq!(product.name, "Laptop");
        assert_eq!(product.batch_number, "BATCH001");
        assert_eq!(
            product.manufacture_date,
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(product.created_at, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert_eq!(product.added_at, NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(product.status, Some(LifecycleStatus::PendingPickup));
        assert!(product.is_claimable());
    }

    #[test]
    fn missing_status_reads_as_active() {
        let product = ProductRecord::new("RFID-2");
        assert_eq!(product.status_label(), "Active");
        assert!(!product.is_claimable());
    }

    #[test]
    fn calendar_date_ignores_garbage() {
        assert_eq!(parse_calendar_date("  "), None);
        assert_eq!(parse_calendar_date("yesterday"), None);
        assert_eq!(
            parse_calendar_date("2025-01-05 10:00:00"),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
    }
}
