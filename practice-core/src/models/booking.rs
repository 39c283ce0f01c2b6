use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    #[serde(rename = "1-hour session")]
    OneHourSession,
    #[serde(rename = "6-hour intensive")]
    SixHourIntensive,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHourSession => "1-hour session",
            Self::SixHourIntensive => "6-hour intensive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1-hour session" | "1h" => Some(Self::OneHourSession),
            "6-hour intensive" | "6h" => Some(Self::SixHourIntensive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    /// Weak reference to a [`Customer`](super::Customer); may dangle.
    pub customer_id: String,
    /// Internally generated id, or an import-prefixed id for bookings merged
    /// from an external calendar.
    pub external_event_id: String,
    pub service_type: ServiceType,
    /// ISO-8601 timestamp, either with an offset (`2026-01-15T09:00:00Z`) or
    /// without one, in which case it is read as local wall-clock time.
    pub appointment_date_time: String,
    #[serde(default)]
    pub notes: String,
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

impl Booking {
    /// The appointment as local wall-clock time.
    ///
    /// Returns `None` when the stored timestamp cannot be parsed; callers treat
    /// such bookings as matching no date.
    pub fn local_appointment(&self) -> Option<NaiveDateTime> {
        parse_local_timestamp(&self.appointment_date_time)
    }

    pub fn local_date(&self) -> Option<NaiveDate> {
        self.local_appointment().map(|dt| dt.date())
    }

    pub fn has_external_prefix(
        &self,
        prefix: &str,
    ) -> bool {
        self.external_event_id.starts_with(prefix)
    }
}

fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
