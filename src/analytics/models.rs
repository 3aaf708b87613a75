use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const USERTYPE_NORMAL: &str = "normal";
pub const USERTYPE_SUPER: &str = "super";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "expired" => Some(SubscriptionStatus::Expired),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// A dashboard user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub usertype: String,
    pub is_verified: bool,
    pub state: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    /// Id of the owning [`Label`].
    pub user_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub price: f64,
    pub status: String,
    pub start_date: NaiveDate,
    pub created_at: i64,
}

/// A subscription joined with the label that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSubscription {
    pub plan_name: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub usertype: String,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserTypeCount {
    pub normal: usize,
    #[serde(rename = "super")]
    pub super_: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCount {
    pub plan_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicDetails {
    pub user_type_count: UserTypeCount,
    pub verified_count: usize,
    pub active_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_plan: Option<PlanCount>,
    pub total_subscriptions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCountBySubscription {
    pub normal_count: usize,
    pub super_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusTotals {
    pub active_subscriptions: usize,
    pub expired_subscriptions: usize,
    pub cancelled_subscriptions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDetails {
    pub user_count_by_subscription: UserCountBySubscription,
    pub subscription_status_totals: SubscriptionStatusTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSummary {
    pub count: usize,
    pub active: usize,
    pub expired: usize,
    pub cancelled: usize,
}

/// `all` and one key per label state, then usertype.
pub type UserDetails = BTreeMap<String, BTreeMap<String, StatusSummary>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserTypePlans {
    pub normal: Vec<PlanCount>,
    #[serde(rename = "super")]
    pub super_: Vec<PlanCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusPlans {
    pub active: UserTypePlans,
    pub cancelled: UserTypePlans,
    pub expired: UserTypePlans,
}

/// Keyed by bucket size in months.
pub type PlanDetails = BTreeMap<u32, StatusPlans>;

/// `all` and one key per label state, then month number.
pub type TrendDetails = BTreeMap<String, BTreeMap<u32, usize>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPlan {
    #[serde(rename = "_id")]
    pub plan_id: String,
    pub count: usize,
    pub plan_name: String,
    pub price: f64,
}
