use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Who is logging and for which calendar day. Passed into every core call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
}

impl RequestContext {
    pub fn new(user_id: Uuid, date: Date) -> Self {
        Self { user_id, date }
    }

    /// Context for today's log (UTC).
    pub fn today(user_id: Uuid) -> Self {
        Self::new(user_id, today())
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
