//! Post-commit notification composition and fan-out
//!
//! Every committed transition fans status notifications out to the parties
//! that care: the requester on repair updates, the issuer on payment and
//! dispute, every owner on dispute escalation. Dispatch is fire-and-forget
//! per recipient; a failed delivery is logged and recorded in the
//! [`DeliveryReport`] but never rolls back or fails the transition. No
//! retries.

use chrono::Utc;
use tracing::{debug, warn};

use crate::gateway::PresentationGateway;
use crate::invoice::Invoice;
use crate::record::TimeStamp;
use crate::repair::{RepairRequest, RepairStatus};

/// Typed direct-message payloads. The gateway owns the visual styling; the
/// core only decides the content.
#[derive(Debug, Clone)]
pub enum Notification {
    /// To the requester after any repair transition.
    RepairUpdate {
        repair_id: String,
        vehicle: String,
        status: RepairStatus,
        mechanic_id: String,
    },
    /// To the payer when an invoice is issued to them.
    InvoiceIssued {
        invoice_id: String,
        issuer_id: String,
        vehicle: String,
        amount: u64,
    },
    /// To the issuer when their invoice is paid.
    PaymentReceived {
        invoice_id: String,
        payer_id: String,
        vehicle: String,
        amount: u64,
        paid_at: TimeStamp<Utc>,
    },
    /// To the issuer when their invoice is disputed.
    InvoiceDisputed {
        invoice_id: String,
        payer_id: String,
        vehicle: String,
        amount: u64,
        disputed_at: TimeStamp<Utc>,
    },
    /// High-visibility escalation to each owner, carrying the full record.
    DisputeEscalation { invoice: Invoice },
}

/// Who a fan-out reached and who it could not.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<String>,
}

impl DeliveryReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

fn dispatch(
    gateway: &dyn PresentationGateway,
    recipient: &str,
    note: &Notification,
    report: &mut DeliveryReport,
) {
    match gateway.direct_message(recipient, note) {
        Ok(()) => {
            debug!(recipient, "notification delivered");
            report.delivered.push(recipient.to_string());
        }
        Err(e) => {
            warn!(recipient, error = %e, "notification undeliverable");
            report.failed.push(recipient.to_string());
        }
    }
}

/// Tell the requester their repair changed status and who acted on it.
pub fn repair_update(
    gateway: &dyn PresentationGateway,
    repair: &RepairRequest,
    mechanic_id: &str,
) -> DeliveryReport {
    let note = Notification::RepairUpdate {
        repair_id: repair.id.clone(),
        vehicle: repair.vehicle.clone(),
        status: repair.status,
        mechanic_id: mechanic_id.to_string(),
    };

    let mut report = DeliveryReport::default();
    dispatch(gateway, &repair.requester_id, &note, &mut report);
    report
}

/// Tell the payer a new invoice landed on them.
pub fn invoice_issued(gateway: &dyn PresentationGateway, invoice: &Invoice) -> DeliveryReport {
    let note = Notification::InvoiceIssued {
        invoice_id: invoice.id.clone(),
        issuer_id: invoice.issuer_id.clone(),
        vehicle: invoice.vehicle.clone(),
        amount: invoice.amount,
    };

    let mut report = DeliveryReport::default();
    dispatch(gateway, &invoice.payer_id, &note, &mut report);
    report
}

/// Tell the issuer their invoice was paid.
pub fn payment_received(gateway: &dyn PresentationGateway, invoice: &Invoice) -> DeliveryReport {
    let paid_at = invoice.paid_at.clone().unwrap_or_else(TimeStamp::now);
    let note = Notification::PaymentReceived {
        invoice_id: invoice.id.clone(),
        payer_id: invoice.payer_id.clone(),
        vehicle: invoice.vehicle.clone(),
        amount: invoice.amount,
        paid_at,
    };

    let mut report = DeliveryReport::default();
    dispatch(gateway, &invoice.issuer_id, &note, &mut report);
    report
}

/// Tell the issuer their invoice was disputed, then escalate to every owner
/// with the full record detail.
pub fn invoice_disputed(gateway: &dyn PresentationGateway, invoice: &Invoice) -> DeliveryReport {
    let disputed_at = invoice.disputed_at.clone().unwrap_or_else(TimeStamp::now);
    let note = Notification::InvoiceDisputed {
        invoice_id: invoice.id.clone(),
        payer_id: invoice.payer_id.clone(),
        vehicle: invoice.vehicle.clone(),
        amount: invoice.amount,
        disputed_at,
    };

    let mut report = DeliveryReport::default();
    dispatch(gateway, &invoice.issuer_id, &note, &mut report);

    let escalation = Notification::DisputeEscalation {
        invoice: invoice.clone(),
    };
    for owner in gateway.owner_ids() {
        dispatch(gateway, &owner, &escalation, &mut report);
    }

    report
}
