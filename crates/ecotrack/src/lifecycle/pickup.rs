use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PickupStatus {
    Pending,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Completed, Self::Cancelled]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl Serialize for PickupStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PickupStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // The backend may grow new states; treat them as still pending.
        Ok(Self::parse(&raw).unwrap_or(Self::Pending))
    }
}

/// A logistics request to collect products from a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRequest {
    #[serde(alias = "_id", alias = "pickup_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub location: String,
    #[serde(
        rename = "preferredDate",
        alias = "preferred_date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_date: Option<String>,
    #[serde(default = "default_status")]
    pub status: PickupStatus,
}

fn default_status() -> PickupStatus {
    PickupStatus::Pending
}

impl PickupRequest {
    pub fn preferred_day(&self) -> Option<NaiveDate> {
        self.preferred_date
            .as_deref()
            .and_then(super::domain::parse_calendar_date)
    }
}

/// A pickup the customer is asking for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPickup {
    pub email: String,
    pub location: String,
    #[serde(
        rename = "preferredDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_date: Option<NaiveDate>,
}

/// Pickup counts per status, in display order.
pub fn status_counts(pickups: &[PickupRequest]) -> BTreeMap<PickupStatus, usize> {
    let mut counts: BTreeMap<PickupStatus, usize> = PickupStatus::ordered()
        .into_iter()
        .map(|status| (status, 0))
        .collect();
    for pickup in pickups {
        *counts.entry(pickup.status).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_pickup() {
        let pickup: PickupRequest = serde_json::from_value(json!({
            "_id": "pk-1",
            "email": "sam@example.com",
            "location": "12 Green St",
            "preferredDate": "2025-07-01",
            "status": "Completed"
        }))
        .expect("decodes");

        assert_eq!(pickup.id, "pk-1");
        assert_eq!(pickup.status, PickupStatus::Completed);
        assert_eq!(pickup.preferred_day(), NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    #[test]
    fn unknown_or_missing_status_is_pending() {
        let pickup: PickupRequest = serde_json::from_value(json!({
            "id": "pk-2",
            "email": "sam@example.com",
            "status": "Rescheduled"
        }))
        .expect("decodes");
        assert_eq!(pickup.status, PickupStatus::Pending);

        let pickup: PickupRequest =
            serde_json::from_value(json!({ "id": "pk-3", "email": "sam@example.com" }))
                .expect("decodes");
        assert_eq!(pickup.status, PickupStatus::Pending);
    }

    #[test]
    fn new_pickup_omits_missing_date() {
        let body = serde_json::to_value(NewPickup {
            email: "sam@example.com".into(),
            location: "Depot 4".into(),
            preferred_date: None,
        })
        .expect("encodes");
        assert_eq!(body, json!({ "email": "sam@example.com", "location": "Depot 4" }));
    }

    #[test]
    fn counts_cover_every_status() {
        let pickups = vec![
            PickupRequest {
                id: "1".into(),
                email: "a@example.com".into(),
                location: String::new(),
                preferred_date: None,
                status: PickupStatus::Cancelled,
            },
            PickupRequest {
                id: "2".into(),
                email: "a@example.com".into(),
                location: String::new(),
                preferred_date: None,
                status: PickupStatus::Cancelled,
            },
        ];
        let counts = status_counts(&pickups);
        assert_eq!(counts[&PickupStatus::Pending], 0);
        assert_eq!(counts[&PickupStatus::Completed], 0);
        assert_eq!(counts[&PickupStatus::Cancelled], 2);
    }
}
