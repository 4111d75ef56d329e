use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a booking. Resolved once at the handler boundary and passed
/// into services as a typed value; the wire format keeps the historical
/// upper-case strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BookedBy {
    #[serde(rename = "ONLINE", alias = "online")]
    Online,

    #[serde(rename = "DISPENSARY-ADMIN", alias = "dispensary-admin")]
    DispensaryAdmin,

    #[serde(rename = "DISPENSARY-STAFF", alias = "dispensary-staff")]
    DispensaryStaff,

    #[serde(rename = "SUPER-ADMIN", alias = "super-admin")]
    SuperAdmin,

    #[serde(rename = "CHANNEL-PARTNER", alias = "channel-partner")]
    ChannelPartner,
}

impl fmt::Display for BookedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookedBy::Online => write!(f, "ONLINE"),
            BookedBy::DispensaryAdmin => write!(f, "DISPENSARY-ADMIN"),
            BookedBy::DispensaryStaff => write!(f, "DISPENSARY-STAFF"),
            BookedBy::SuperAdmin => write!(f, "SUPER-ADMIN"),
            BookedBy::ChannelPartner => write!(f, "CHANNEL-PARTNER"),
        }
    }
}
