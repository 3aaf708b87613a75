//! Dashboard analytics over labels and their subscriptions.

mod models;
mod reports;
mod schema;
mod store;

pub use models::{
    BasicDetails, Label, LabelSubscription, PlanCount, PlanDetails, StatusPlans, StatusSummary,
    Subscription, SubscriptionDetails, SubscriptionStatus, SubscriptionStatusTotals, TopPlan,
    TrendDetails, UserCountBySubscription, UserDetails, UserTypeCount, UserTypePlans,
    USERTYPE_NORMAL, USERTYPE_SUPER,
};
pub use reports::{
    months_between, plan_details, trend_details, user_details, AnalyticsReports, PLAN_BUCKETS,
};
pub use store::{AnalyticsStore, SqliteAnalyticsStore};
