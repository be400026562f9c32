use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Leave categories offered by the company. Three of them draw on a per-user
/// hour quota; the rest are uncapped and only tracked.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Comp,
    Birthday,
    Personal,
    Sick,
    Official,
    Marriage,
    Funeral,
    Maternity,
    Paternity,
    Menstrual,
    FamilyCare,
    WorkInjury,
    Other,
}

impl LeaveType {
    /// Whether requests of this type are limited by a user quota.
    pub fn is_quota_limited(self) -> bool {
        matches!(self, LeaveType::Annual | LeaveType::Comp | LeaveType::Birthday)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_limited_types() {
        assert!(LeaveType::Annual.is_quota_limited());
        assert!(LeaveType::Comp.is_quota_limited());
        assert!(LeaveType::Birthday.is_quota_limited());
        assert!(!LeaveType::Sick.is_quota_limited());
        assert!(!LeaveType::Other.is_quota_limited());
    }

    #[test]
    fn string_round_trip_matches_storage_format() {
        use std::str::FromStr;

        assert_eq!(LeaveType::FamilyCare.to_string(), "family_care");
        assert_eq!(LeaveType::from_str("work_injury").unwrap(), LeaveType::WorkInjury);
        assert_eq!(RequestStatus::Pending.to_string(), "pending");
        assert_eq!(RequestStatus::from_str("cancelled").unwrap(), RequestStatus::Cancelled);
    }
}
