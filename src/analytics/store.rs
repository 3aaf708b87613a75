//! SQLite store for labels and subscriptions.
//!
//! Both tables are filled by other services. The inserts here exist for
//! seeding and tests; every report query is read-only.

use super::models::{
    Label, LabelSubscription, PlanCount, Subscription, SubscriptionStatus,
    SubscriptionStatusTotals, TopPlan, UserTypeCount, USERTYPE_NORMAL, USERTYPE_SUPER,
};
use super::schema::ANALYTICS_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::{PoolSettings, SqlitePool};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait AnalyticsStore: Send + Sync {
    fn insert_label(&self, label: &Label) -> Result<()>;

    fn insert_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Labels whose usertype is `normal` or `super`, counted per usertype.
    fn count_labels_by_usertype(&self) -> Result<UserTypeCount>;

    fn count_verified_labels(&self) -> Result<usize>;

    fn count_subscriptions(&self) -> Result<usize>;

    fn count_subscriptions_by_status(&self) -> Result<SubscriptionStatusTotals>;

    /// Most frequent plan name over all subscriptions. Ties go to the plan seen first.
    fn top_plan_name(&self) -> Result<Option<PlanCount>>;

    /// Subscriptions joined to their label; subscriptions without a label are dropped.
    /// With `start_from`, only subscriptions starting on or after that date.
    fn label_subscriptions(&self, start_from: Option<NaiveDate>) -> Result<Vec<LabelSubscription>>;

    /// Plans by number of subscriptions created in `[from, to]` (Unix seconds).
    fn top_plans_created_between(&self, from: i64, to: i64, limit: usize) -> Result<Vec<TopPlan>>;
}

#[derive(Clone)]
pub struct SqliteAnalyticsStore {
    pool: SqlitePool,
}

impl SqliteAnalyticsStore {
    pub fn new<P: AsRef<Path>>(db_path: P, settings: PoolSettings) -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::open(db_path, "analytics", ANALYTICS_VERSIONED_SCHEMAS, settings)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::in_memory("analytics", ANALYTICS_VERSIONED_SCHEMAS)?,
        })
    }

    fn count(conn: &Connection, sql: &str, param: Option<&str>) -> Result<usize> {
        let count: i64 = match param {
            Some(p) => conn.query_row(sql, params![p], |r| r.get(0))?,
            None => conn.query_row(sql, [], |r| r.get(0))?,
        };
        Ok(count as usize)
    }
}

impl AnalyticsStore for SqliteAnalyticsStore {
    fn insert_label(&self, label: &Label) -> Result<()> {
        let conn = self.pool.write_conn();
        let conn = conn.lock().unwrap();
        conn.execute(
            "INSERT INTO labels (id, usertype, is_verified, state, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                label.id,
                label.usertype,
                label.is_verified as i32,
                label.state,
                label.created_at
            ],
        )?;
        Ok(())
    }

    fn insert_subscription(&self, subscription: &Subscription) -> Result<()> {
        let conn = self.pool.write_conn();
        let conn = conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, plan_name, price, status, start_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                subscription.id,
                subscription.user_id,
                subscription.plan_id,
                subscription.plan_name,
                subscription.price,
                subscription.status,
                subscription.start_date.format(DATE_FORMAT).to_string(),
                subscription.created_at,
            ],
        )?;
        Ok(())
    }

    fn count_labels_by_usertype(&self) -> Result<UserTypeCount> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let sql = "SELECT COUNT(*) FROM labels WHERE usertype = ?1";
        Ok(UserTypeCount {
            normal: Self::count(&conn, sql, Some(USERTYPE_NORMAL))?,
            super_: Self::count(&conn, sql, Some(USERTYPE_SUPER))?,
        })
    }

    fn count_verified_labels(&self) -> Result<usize> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        Self::count(&conn, "SELECT COUNT(*) FROM labels WHERE is_verified = 1", None)
    }

    fn count_subscriptions(&self) -> Result<usize> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        Self::count(&conn, "SELECT COUNT(*) FROM subscriptions", None)
    }

    fn count_subscriptions_by_status(&self) -> Result<SubscriptionStatusTotals> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let sql = "SELECT COUNT(*) FROM subscriptions WHERE status = ?1";
        Ok(SubscriptionStatusTotals {
            active_subscriptions: Self::count(
                &conn,
                sql,
                Some(SubscriptionStatus::Active.as_str()),
            )?,
            expired_subscriptions: Self::count(
                &conn,
                sql,
                Some(SubscriptionStatus::Expired.as_str()),
            )?,
            cancelled_subscriptions: Self::count(
                &conn,
                sql,
                Some(SubscriptionStatus::Cancelled.as_str()),
            )?,
        })
    }

    fn top_plan_name(&self) -> Result<Option<PlanCount>> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let top = conn
            .query_row(
                r#"
                SELECT plan_name, COUNT(*) AS n, MIN(rowid) AS first_seen
                FROM subscriptions
                GROUP BY plan_name
                ORDER BY n DESC, first_seen ASC
                LIMIT 1
                "#,
                [],
                |r| {
                    Ok(PlanCount {
                        plan_name: r.get(0)?,
                        count: r.get::<_, i64>(1)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(top)
    }

    fn label_subscriptions(&self, start_from: Option<NaiveDate>) -> Result<Vec<LabelSubscription>> {
        let start_from = start_from.map(|d| d.format(DATE_FORMAT).to_string());
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT s.plan_name, s.status, s.start_date, l.usertype, l.state
            FROM subscriptions s
            JOIN labels l ON l.id = s.user_id
            WHERE ?1 IS NULL OR s.start_date >= ?1
            ORDER BY s.rowid
            "#,
        )?;
        let rows = stmt
            .query_map(params![start_from], |r| {
                let start_date: String = r.get(2)?;
                let start_date = NaiveDate::parse_from_str(&start_date, DATE_FORMAT).map_err(
                    |e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)),
                )?;
                Ok(LabelSubscription {
                    plan_name: r.get(0)?,
                    status: r.get(1)?,
                    start_date,
                    usertype: r.get(3)?,
                    state: r.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn top_plans_created_between(&self, from: i64, to: i64, limit: usize) -> Result<Vec<TopPlan>> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        // plan_name and price come from the earliest row of each plan in the window
        let mut stmt = conn.prepare(
            r#"
            WITH windowed AS (
                SELECT rowid, plan_id, plan_name, price
                FROM subscriptions
                WHERE created_at >= ?1 AND created_at <= ?2
            ),
            grouped AS (
                SELECT plan_id, COUNT(*) AS n, MIN(rowid) AS first_rowid
                FROM windowed
                GROUP BY plan_id
            )
            SELECT g.plan_id, g.n, w.plan_name, w.price
            FROM grouped g
            JOIN windowed w ON w.rowid = g.first_rowid
            ORDER BY g.n DESC, g.first_rowid ASC
            LIMIT ?3
            "#,
        )?;
        let plans = stmt
            .query_map(params![from, to, limit as i64], |r| {
                Ok(TopPlan {
                    plan_id: r.get(0)?,
                    count: r.get::<_, i64>(1)? as usize,
                    plan_name: r.get(2)?,
                    price: r.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> SqliteAnalyticsStore {
        let store = SqliteAnalyticsStore::in_memory().unwrap();
        store.insert_label(&label("l1", "normal", true, Some("Goa"))).unwrap();
        store.insert_label(&label("l2", "super", false, Some("Kerala"))).unwrap();
        store.insert_label(&label("l3", "normal", true, None)).unwrap();
        store.insert_label(&label("l4", "admin", true, Some("Goa"))).unwrap();

        let d = date(2024, 5, 1);
        store.insert_subscription(&subscription("s1", "l1", "Basic", "active", d, 100)).unwrap();
        store.insert_subscription(&subscription("s2", "l2", "Pro", "active", d, 200)).unwrap();
        store.insert_subscription(&subscription("s3", "l2", "Pro", "expired", d, 300)).unwrap();
        store.insert_subscription(&subscription("s4", "ghost", "Basic", "cancelled", d, 400)).unwrap();
        store.insert_subscription(&subscription("s5", "l3", "Basic", "active", date(2023, 1, 1), 500)).unwrap();
        store
    }

    #[test]
    fn label_counts() {
        let store = seeded();
        assert_eq!(
            store.count_labels_by_usertype().unwrap(),
            UserTypeCount {
                normal: 2,
                super_: 1
            }
        );
        assert_eq!(store.count_verified_labels().unwrap(), 3);
    }

    #[test]
    fn subscription_counts() {
        let store = seeded();
        assert_eq!(store.count_subscriptions().unwrap(), 5);
        assert_eq!(
            store.count_subscriptions_by_status().unwrap(),
            SubscriptionStatusTotals {
                active_subscriptions: 3,
                expired_subscriptions: 1,
                cancelled_subscriptions: 1,
            }
        );
    }

    #[test]
    fn top_plan_name_prefers_first_seen_on_ties() {
        let store = seeded();
        assert_eq!(
            store.top_plan_name().unwrap(),
            Some(PlanCount {
                plan_name: "Basic".to_string(),
                count: 3
            })
        );

        let empty = SqliteAnalyticsStore::in_memory().unwrap();
        assert_eq!(empty.top_plan_name().unwrap(), None);
    }

    #[test]
    fn join_drops_orphans_and_filters_by_start() {
        let store = seeded();
        let all = store.label_subscriptions(None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].state.as_deref(), Some("Goa"));
        assert_eq!(all[1].usertype, "super");
        assert_eq!(all[3].state, None);

        let recent = store.label_subscriptions(Some(date(2024, 1, 1))).unwrap();
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn top_plans_in_window() {
        let store = seeded();
        let plans = store.top_plans_created_between(150, 450, 3).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].plan_id, "plan-pro");
        assert_eq!(plans[0].count, 2);
        assert_eq!(plans[1].plan_id, "plan-basic");
        assert_eq!(plans[1].count, 1);

        assert_eq!(store.top_plans_created_between(0, 1000, 1).unwrap().len(), 1);
    }
}
