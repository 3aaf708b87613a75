//! Dashboard report shaping.
//!
//! Reports that depend on the current date take it as an argument.

use super::models::{
    BasicDetails, LabelSubscription, PlanCount, PlanDetails, StatusPlans, StatusSummary,
    SubscriptionDetails, SubscriptionStatus, TopPlan, TrendDetails, UserCountBySubscription,
    UserDetails, UserTypePlans, USERTYPE_NORMAL, USERTYPE_SUPER,
};
use super::store::AnalyticsStore;
use anyhow::Result;
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const ALL_KEY: &str = "all";
pub const UNKNOWN_STATE: &str = "unknown";
pub const PLAN_BUCKETS: [u32; 5] = [1, 3, 6, 9, 12];
pub const TOP_PLANS_WINDOW_MONTHS: u32 = 3;
pub const TOP_PLANS_LIMIT: usize = 3;

/// Whole calendar months between `start` and `today`, ignoring days.
pub fn months_between(start: NaiveDate, today: NaiveDate) -> i32 {
    (today.year() - start.year()) * 12 + today.month() as i32 - start.month() as i32
}

fn state_key(state: &Option<String>) -> String {
    state.clone().unwrap_or_else(|| UNKNOWN_STATE.to_string())
}

pub fn user_details(rows: &[LabelSubscription]) -> UserDetails {
    let mut details = UserDetails::new();
    details.insert(ALL_KEY.to_string(), BTreeMap::new());

    for row in rows {
        let status = SubscriptionStatus::parse(&row.status);
        for key in [ALL_KEY.to_string(), state_key(&row.state)] {
            let summary = details
                .entry(key)
                .or_default()
                .entry(row.usertype.clone())
                .or_insert_with(StatusSummary::default);
            summary.count += 1;
            match status {
                Some(SubscriptionStatus::Active) => summary.active += 1,
                Some(SubscriptionStatus::Expired) => summary.expired += 1,
                Some(SubscriptionStatus::Cancelled) => summary.cancelled += 1,
                None => {}
            }
        }
    }
    details
}

/// First day counted by [`plan_details`].
pub fn plan_details_window_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(12)).unwrap_or(today)
}

pub fn plan_details(rows: &[LabelSubscription], today: NaiveDate) -> PlanDetails {
    let mut details: PlanDetails = PLAN_BUCKETS
        .iter()
        .map(|k| (*k, StatusPlans::default()))
        .collect();
    let window_start = plan_details_window_start(today);

    for row in rows.iter().filter(|r| r.start_date >= window_start) {
        let Some(status) = SubscriptionStatus::parse(&row.status) else {
            continue;
        };
        let months_ago = months_between(row.start_date, today);

        for bucket in PLAN_BUCKETS {
            if months_ago >= bucket as i32 {
                continue;
            }
            let Some(by_status) = details.get_mut(&bucket) else {
                continue;
            };
            let by_usertype = match status {
                SubscriptionStatus::Active => &mut by_status.active,
                SubscriptionStatus::Cancelled => &mut by_status.cancelled,
                SubscriptionStatus::Expired => &mut by_status.expired,
            };
            let Some(plans) = usertype_plans(by_usertype, &row.usertype) else {
                continue;
            };
            match plans.iter_mut().find(|p| p.plan_name == row.plan_name) {
                Some(plan) => plan.count += 1,
                None => plans.push(PlanCount {
                    plan_name: row.plan_name.clone(),
                    count: 1,
                }),
            }
        }
    }
    details
}

fn usertype_plans<'a>(plans: &'a mut UserTypePlans, usertype: &str) -> Option<&'a mut Vec<PlanCount>> {
    match usertype {
        USERTYPE_NORMAL => Some(&mut plans.normal),
        USERTYPE_SUPER => Some(&mut plans.super_),
        _ => None,
    }
}

/// First day counted by [`trend_details`].
pub fn trend_window_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
}

/// Subscriptions started per state and month, from January up to the month
/// before `today`.
pub fn trend_details(rows: &[LabelSubscription], today: NaiveDate) -> TrendDetails {
    let months: Vec<u32> = (1..today.month()).collect();
    let empty_year = || months.iter().map(|m| (*m, 0)).collect::<BTreeMap<u32, usize>>();

    let mut details = TrendDetails::new();
    for row in rows {
        if row.start_date.year() != today.year() || row.start_date.month() >= today.month() {
            continue;
        }
        *details
            .entry(state_key(&row.state))
            .or_insert_with(empty_year)
            .entry(row.start_date.month())
            .or_insert(0) += 1;
    }

    let mut all = empty_year();
    for by_month in details.values() {
        for (month, count) in by_month {
            *all.entry(*month).or_insert(0) += count;
        }
    }
    details.insert(ALL_KEY.to_string(), all);
    details
}

/// Report entry points backed by an [`AnalyticsStore`].
#[derive(Clone)]
pub struct AnalyticsReports {
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsReports {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AnalyticsStore> {
        &self.store
    }

    pub fn basic_details(&self) -> Result<BasicDetails> {
        let status_totals = self.store.count_subscriptions_by_status()?;
        Ok(BasicDetails {
            user_type_count: self.store.count_labels_by_usertype()?,
            verified_count: self.store.count_verified_labels()?,
            active_count: status_totals.active_subscriptions,
            top_plan: self.store.top_plan_name()?,
            total_subscriptions: self.store.count_subscriptions()?,
        })
    }

    pub fn subscription_details(&self) -> Result<SubscriptionDetails> {
        let usertypes = self.store.count_labels_by_usertype()?;
        Ok(SubscriptionDetails {
            user_count_by_subscription: UserCountBySubscription {
                normal_count: usertypes.normal,
                super_count: usertypes.super_,
            },
            subscription_status_totals: self.store.count_subscriptions_by_status()?,
        })
    }

    pub fn user_details(&self) -> Result<UserDetails> {
        Ok(user_details(&self.store.label_subscriptions(None)?))
    }

    pub fn plan_details(&self, today: NaiveDate) -> Result<PlanDetails> {
        let rows = self
            .store
            .label_subscriptions(Some(plan_details_window_start(today)))?;
        Ok(plan_details(&rows, today))
    }

    pub fn trend_details(&self, today: NaiveDate) -> Result<TrendDetails> {
        let rows = self
            .store
            .label_subscriptions(Some(trend_window_start(today)))?;
        Ok(trend_details(&rows, today))
    }

    /// Most subscribed plans among subscriptions created in the last three months.
    pub fn top_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<TopPlan>> {
        let from = now
            .checked_sub_months(Months::new(TOP_PLANS_WINDOW_MONTHS))
            .unwrap_or(now);
        self.store
            .top_plans_created_between(from.timestamp(), now.timestamp(), TOP_PLANS_LIMIT)
    }
}
