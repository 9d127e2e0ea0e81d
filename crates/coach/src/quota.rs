//! Quota ledger: per-user message counter checked against the plan limit.

use coach_core::{Plan, UNLIMITED_MESSAGES};
use database::{plan, usage, Database};
use tracing::{debug, info};

use crate::error::Result;

/// Usage read at the start of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    pub plan: Plan,
    /// Messages used so far this period.
    pub used: i64,
    /// Effective limit; `None` when unlimited.
    pub limit: Option<i64>,
    /// Whether the exchange must be refused.
    pub blocked: bool,
}

impl QuotaSnapshot {
    /// Remaining messages for a given usage count, or the unlimited sentinel.
    pub fn remaining_at(&self, used: i64) -> i64 {
        match self.limit {
            Some(limit) => (limit - used).max(0),
            None => UNLIMITED_MESSAGES,
        }
    }

    /// Remaining messages as of this snapshot.
    pub fn remaining(&self) -> i64 {
        self.remaining_at(self.used)
    }
}

/// Reads and charges the per-user message counter.
///
/// The check and the later increment are separate row-store calls; two
/// exchanges racing from the same user may both pass the check. The limit is
/// a soft one.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    db: Database,
}

impl QuotaLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read usage and the plan limit and decide whether the user may send.
    ///
    /// Premium is unlimited regardless of the stored limit. A missing counter
    /// reads as 0 and a missing or null limit as unlimited.
    pub async fn check_and_peek(&self, user_id: &str, plan: Plan) -> Result<QuotaSnapshot> {
        let used = usage::messages_used(self.db.pool(), user_id).await?;

        let limit = if plan.is_premium() {
            None
        } else {
            plan::get_plan_limit(self.db.pool(), plan)
                .await?
                .and_then(|row| row.message_limit_per_period)
        };

        let blocked = matches!(limit, Some(limit) if used >= limit);

        if blocked {
            info!(user_id, %plan, used, ?limit, "Quota exhausted");
        } else {
            debug!(user_id, %plan, used, ?limit, "Quota check passed");
        }

        Ok(QuotaSnapshot {
            plan,
            used,
            limit,
            blocked,
        })
    }

    /// Charge one completed exchange. Returns the new count.
    ///
    /// Must be called at most once per exchange.
    pub async fn increment(&self, user_id: &str) -> Result<i64> {
        let used = usage::increment_usage(self.db.pool(), user_id).await?;
        debug!(user_id, used, "Usage incremented");
        Ok(used)
    }
}
