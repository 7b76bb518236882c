//! Read-only activity aggregation over the record store
//!
//! Reports and per-mechanic statistics scan the same trees the lifecycles
//! write; nothing here mutates. Scheduling periodic delivery is the host's
//! job, which is why every function takes `now` instead of reading a clock.

use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::invoice::InvoiceStatus;
use crate::repair::RepairStatus;
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn window(self) -> Duration {
        match self {
            ReportPeriod::Daily => Duration::days(1),
            ReportPeriod::Weekly => Duration::weeks(1),
            ReportPeriod::Monthly => Duration::days(30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportPeriod::Daily => "daily",
            ReportPeriod::Weekly => "weekly",
            ReportPeriod::Monthly => "monthly",
        }
    }
}

/// Garage-wide activity inside one reporting window.
#[derive(Debug, PartialEq, Eq)]
pub struct ActivityReport {
    pub period: ReportPeriod,
    pub repairs_filed: usize,
    pub repairs_completed: usize,
    pub repairs_rejected: usize,
    pub invoices_issued: usize,
    pub invoices_paid: usize,
    pub invoices_disputed: usize,
    /// Sum of amounts over invoices paid inside the window.
    pub revenue: u64,
}

pub fn activity_report(
    store: &RecordStore,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Result<ActivityReport, StoreError> {
    let since = now - period.window();

    let repairs = store.repairs()?;
    let invoices = store.invoices()?;

    let in_window = |at: DateTime<Utc>| at > since && at <= now;

    let filed: Vec<_> = repairs
        .iter()
        .filter(|r| in_window(r.created_at.to_datetime_utc()))
        .collect();
    let issued: Vec<_> = invoices
        .iter()
        .filter(|inv| in_window(inv.created_at.to_datetime_utc()))
        .collect();

    let paid_in_window = |inv: &&crate::invoice::Invoice| {
        inv.paid_at
            .as_ref()
            .is_some_and(|at| in_window(at.to_datetime_utc()))
    };

    Ok(ActivityReport {
        period,
        repairs_filed: filed.len(),
        repairs_completed: filed
            .iter()
            .filter(|r| r.status == RepairStatus::Completed)
            .count(),
        repairs_rejected: filed
            .iter()
            .filter(|r| r.status == RepairStatus::Rejected)
            .count(),
        invoices_issued: issued.len(),
        invoices_paid: issued
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .count(),
        invoices_disputed: issued
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Disputed)
            .count(),
        revenue: invoices
            .iter()
            .filter(paid_in_window)
            .map(|inv| inv.amount)
            .sum(),
    })
}

/// One mechanic's track record, all-time counters plus windowed revenue.
#[derive(Debug, PartialEq, Eq)]
pub struct MechanicStats {
    pub invoices_issued: usize,
    pub invoices_paid: usize,
    pub invoices_disputed: usize,
    pub invoices_pending: usize,
    pub revenue_total: u64,
    pub revenue_day: u64,
    pub revenue_week: u64,
    pub revenue_month: u64,
    pub repairs_completed: usize,
    pub repairs_in_progress: usize,
}

pub fn mechanic_stats(
    store: &RecordStore,
    mechanic_id: &str,
    now: DateTime<Utc>,
) -> Result<MechanicStats, StoreError> {
    let invoices: Vec<_> = store
        .invoices()?
        .into_iter()
        .filter(|inv| inv.issuer_id == mechanic_id)
        .collect();
    let repairs: Vec<_> = store
        .repairs()?
        .into_iter()
        .filter(|r| r.assigned_to.as_deref() == Some(mechanic_id))
        .collect();

    let revenue_since = |since: DateTime<Utc>| -> u64 {
        invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .filter(|inv| {
                inv.paid_at
                    .as_ref()
                    .is_some_and(|at| at.to_datetime_utc() > since)
            })
            .map(|inv| inv.amount)
            .sum()
    };

    let count_status =
        |status: InvoiceStatus| invoices.iter().filter(|inv| inv.status == status).count();

    Ok(MechanicStats {
        invoices_issued: invoices.len(),
        invoices_paid: count_status(InvoiceStatus::Paid),
        invoices_disputed: count_status(InvoiceStatus::Disputed),
        invoices_pending: count_status(InvoiceStatus::Pending),
        revenue_total: invoices
            .iter()
            .filter(|inv| inv.status == InvoiceStatus::Paid)
            .map(|inv| inv.amount)
            .sum(),
        revenue_day: revenue_since(now - Duration::days(1)),
        revenue_week: revenue_since(now - Duration::weeks(1)),
        revenue_month: revenue_since(now - Duration::days(30)),
        repairs_completed: repairs
            .iter()
            .filter(|r| r.status == RepairStatus::Completed)
            .count(),
        repairs_in_progress: repairs
            .iter()
            .filter(|r| r.status == RepairStatus::InProgress)
            .count(),
    })
}
