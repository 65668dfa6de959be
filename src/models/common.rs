use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn duration_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Yearly => 365,
        }
    }

    /// Due date of the cycle following a payment made at `paid_at`.
    pub fn next_due(&self, paid_at: DateTime<Utc>) -> DateTime<Utc> {
        paid_at + Duration::days(self.duration_days())
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingCycle::Monthly => write!(f, "monthly"),
            BillingCycle::Yearly => write!(f, "yearly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_due_advances_one_cycle() {
        let paid_at = Utc::now();
        assert_eq!(
            BillingCycle::Monthly.next_due(paid_at),
            paid_at + Duration::days(30)
        );
        assert_eq!(
            BillingCycle::Yearly.next_due(paid_at),
            paid_at + Duration::days(365)
        );
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BillingCycle::Monthly).unwrap(),
            "\"monthly\""
        );
    }
}
