//! Newsletter subscriber model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use frechnel_core::{Email, SubscriberId};

/// A newsletter subscriber. Created once, never updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: SubscriberId,
    pub email: Email,
    pub subscribed_at: DateTime<Utc>,
}
