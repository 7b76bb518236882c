//! Service layer API for repair and invoice workflow operations
//!
//! Orchestration order is fixed: authorize, commit to the store, then
//! presentation and notifications. Nothing after the store write can fail
//! the operation; render and delivery problems are logged and the committed
//! record stands.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::LifecycleError;
use crate::gateway::{ActionEvent, ActionKind, PresentationGateway, RecordView};
use crate::invoice::{Invoice, InvoiceAction, InvoiceStatus};
use crate::notify;
use crate::policy;
use crate::rank::RoleMap;
use crate::record::{MessageRef, Surface, TimeStamp};
use crate::repair::{ComplexityTier, RepairAction, RepairRequest};
use crate::store::RecordStore;

/// A client's request to file a new repair.
#[derive(Debug, Clone)]
pub struct CreateRepair {
    pub requester_id: String,
    pub vehicle: String,
    pub problem: String,
    pub tier: Option<ComplexityTier>,
}

/// A mechanic's request to bill a client.
#[derive(Debug, Clone)]
pub struct IssueInvoice {
    pub issuer_id: String,
    pub payer_id: String,
    pub vehicle: String,
    pub description: String,
    pub amount: u64,
}

/// Issuance result. `payer_notified` is false when the direct message to
/// the payer bounced; the invoice still stands and the host should surface
/// a non-fatal warning to the issuer.
#[derive(Debug)]
pub struct IssueOutcome {
    pub invoice: Invoice,
    pub payer_notified: bool,
}

/// The record an action event ended up touching.
#[derive(Debug)]
pub enum ActionOutcome {
    Repair(RepairRequest),
    Invoice(Invoice),
}

pub struct GarageService {
    store: RecordStore,
    gateway: Arc<dyn PresentationGateway>,
    roles: RoleMap,
}

impl GarageService {
    pub fn new(store: RecordStore, gateway: Arc<dyn PresentationGateway>, roles: RoleMap) -> Self {
        Self {
            store,
            gateway,
            roles,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Route an inbound action event to the lifecycle it belongs to.
    pub fn handle_action(&self, event: &ActionEvent) -> Result<ActionOutcome, LifecycleError> {
        let repair = |action: RepairAction| {
            self.transition_repair(&event.record_id, &event.actor_id, &event.actor_roles, action)
                .map(ActionOutcome::Repair)
        };

        match event.action {
            ActionKind::Accept => repair(RepairAction::Accept),
            ActionKind::Reject => repair(RepairAction::Reject),
            ActionKind::Progress => repair(RepairAction::Progress),
            ActionKind::Complete => repair(RepairAction::Complete),
            ActionKind::Pay => self
                .pay_invoice(&event.record_id, &event.actor_id)
                .map(ActionOutcome::Invoice),
            ActionKind::Dispute => self
                .dispute_invoice(&event.record_id, &event.actor_id)
                .map(ActionOutcome::Invoice),
        }
    }

    /// File a new repair request. No authorization gate: any client may ask.
    pub fn create_repair(&self, req: CreateRepair) -> Result<RepairRequest, LifecycleError> {
        let mut repair =
            RepairRequest::new(req.requester_id, req.vehicle, req.problem, req.tier)?;
        self.store.insert_repair(&repair)?;

        info!(
            repair_id = %repair.id,
            tier = repair.tier.as_str(),
            "repair request filed"
        );

        match self
            .gateway
            .render(Surface::Intake, RecordView::repair(&repair))
        {
            Ok(at) => {
                if let Some(saved) = self.persist_repair_ref(&repair.id, at) {
                    repair = saved;
                }
            }
            Err(e) => warn!(repair_id = %repair.id, error = %e, "intake render failed"),
        }

        Ok(repair)
    }

    /// Apply a staff action to a repair request.
    ///
    /// Fails with `Forbidden` before touching the record when the actor
    /// holds no staff rank or does not qualify for the request's complexity
    /// tier (head mechanics and the owner bypass the tier gate). The status
    /// edge itself is validated inside the store's compare-and-swap loop, so
    /// a racing transition is re-checked against the committed record and
    /// surfaces as `InvalidTransition` rather than overwriting it.
    pub fn transition_repair(
        &self,
        repair_id: &str,
        actor_id: &str,
        actor_roles: &[String],
        action: RepairAction,
    ) -> Result<RepairRequest, LifecycleError> {
        let ranks = self.roles.resolve(actor_roles);
        if ranks.is_empty() {
            return Err(LifecycleError::Forbidden(
                "only staff may manage repair requests".into(),
            ));
        }

        let existing = self
            .store
            .repair(repair_id)?
            .ok_or_else(|| LifecycleError::NotFound(repair_id.to_string()))?;

        if !policy::can_handle(&ranks, existing.tier) {
            return Err(LifecycleError::Forbidden(format!(
                "{} work requires {} or above",
                existing.tier.as_str(),
                policy::minimum_rank(existing.tier)
            )));
        }

        let mut updated = self.store.update_repair(repair_id, |mut r| {
            let next = r
                .status
                .apply(action)
                .ok_or(LifecycleError::InvalidTransition {
                    action: action.as_str(),
                    status: r.status.as_str(),
                })?;

            r.status = next;
            if matches!(action, RepairAction::Accept | RepairAction::Progress) {
                r.assigned_to = Some(actor_id.to_string());
            }
            r.last_updated_at = TimeStamp::now();
            Ok(r)
        })?;

        info!(
            repair_id,
            action = action.as_str(),
            status = updated.status.as_str(),
            "repair transition committed"
        );

        // Accept/Progress/Complete move the artifact off the intake surface;
        // Reject re-renders in place, terminally marked.
        let target = match action {
            RepairAction::Accept | RepairAction::Progress => Some(Surface::InProgress),
            RepairAction::Complete => Some(Surface::Completed),
            RepairAction::Reject => None,
        };

        let moved = {
            let view = RecordView::repair(&updated);
            match (updated.message_ref.as_ref(), target) {
                (Some(at), Some(to)) => match self.gateway.relocate(at, to, view) {
                    Ok(new_ref) => Some(new_ref),
                    Err(e) => {
                        warn!(repair_id, error = %e, "relocation failed");
                        None
                    }
                },
                (Some(at), None) => {
                    if let Err(e) = self.gateway.update(at, view) {
                        warn!(repair_id, error = %e, "re-render failed");
                    }
                    None
                }
                (None, Some(to)) => match self.gateway.render(to, view) {
                    Ok(new_ref) => Some(new_ref),
                    Err(e) => {
                        warn!(repair_id, error = %e, "render failed");
                        None
                    }
                },
                (None, None) => None,
            }
        };

        if let Some(at) = moved {
            if let Some(saved) = self.persist_repair_ref(repair_id, at) {
                updated = saved;
            }
        }

        notify::repair_update(self.gateway.as_ref(), &updated, actor_id);

        Ok(updated)
    }

    /// Issue an invoice to a client. The payer is direct-messaged; when that
    /// bounces the invoice still stands and the outcome says so.
    pub fn issue_invoice(&self, req: IssueInvoice) -> Result<IssueOutcome, LifecycleError> {
        let mut invoice = Invoice::new(
            req.issuer_id,
            req.payer_id,
            req.vehicle,
            req.description,
            req.amount,
        )?;
        self.store.insert_invoice(&invoice)?;

        info!(invoice_id = %invoice.id, amount = invoice.amount, "invoice issued");

        match self
            .gateway
            .render(Surface::Billing, RecordView::invoice(&invoice))
        {
            Ok(at) => {
                if let Some(saved) = self.persist_invoice_ref(&invoice.id, at) {
                    invoice = saved;
                }
            }
            Err(e) => warn!(invoice_id = %invoice.id, error = %e, "billing render failed"),
        }

        let report = notify::invoice_issued(self.gateway.as_ref(), &invoice);
        if !report.all_delivered() {
            warn!(invoice_id = %invoice.id, "payer could not be notified");
        }

        Ok(IssueOutcome {
            payer_notified: report.all_delivered(),
            invoice,
        })
    }

    /// Settle an invoice. Only the billed client may pay; a paid invoice is
    /// read-only from here on.
    pub fn pay_invoice(&self, invoice_id: &str, actor_id: &str) -> Result<Invoice, LifecycleError> {
        let updated = self.store.update_invoice(invoice_id, |mut inv| {
            if inv.payer_id != actor_id {
                return Err(LifecycleError::Forbidden(
                    "only the billed client may pay this invoice".into(),
                ));
            }
            if inv.status != InvoiceStatus::Pending {
                return Err(LifecycleError::InvalidTransition {
                    action: InvoiceAction::Pay.as_str(),
                    status: inv.status.as_str(),
                });
            }

            inv.status = InvoiceStatus::Paid;
            inv.paid_at = Some(TimeStamp::now());
            inv.resolved_by = Some(actor_id.to_string());
            Ok(inv)
        })?;

        info!(invoice_id, amount = updated.amount, "invoice paid");

        if let Some(at) = &updated.message_ref {
            if let Err(e) = self.gateway.update(at, RecordView::invoice(&updated)) {
                warn!(invoice_id, error = %e, "paid re-render failed");
            }
        }

        notify::payment_received(self.gateway.as_ref(), &updated);

        Ok(updated)
    }

    /// Dispute an invoice. Only the billed client may dispute. The artifact
    /// moves to the dispute surface read-only, and every owner is escalated
    /// to with the full record.
    pub fn dispute_invoice(
        &self,
        invoice_id: &str,
        actor_id: &str,
    ) -> Result<Invoice, LifecycleError> {
        let mut updated = self.store.update_invoice(invoice_id, |mut inv| {
            if inv.payer_id != actor_id {
                return Err(LifecycleError::Forbidden(
                    "only the billed client may dispute this invoice".into(),
                ));
            }
            if inv.status != InvoiceStatus::Pending {
                return Err(LifecycleError::InvalidTransition {
                    action: InvoiceAction::Dispute.as_str(),
                    status: inv.status.as_str(),
                });
            }

            inv.status = InvoiceStatus::Disputed;
            inv.disputed_at = Some(TimeStamp::now());
            inv.resolved_by = Some(actor_id.to_string());
            Ok(inv)
        })?;

        info!(invoice_id, amount = updated.amount, "invoice disputed");

        let moved = {
            let view = RecordView::invoice(&updated);
            match updated.message_ref.as_ref() {
                Some(at) => match self.gateway.relocate(at, Surface::Disputed, view) {
                    Ok(new_ref) => Some(new_ref),
                    Err(e) => {
                        warn!(invoice_id, error = %e, "dispute relocation failed");
                        None
                    }
                },
                None => match self.gateway.render(Surface::Disputed, view) {
                    Ok(new_ref) => Some(new_ref),
                    Err(e) => {
                        warn!(invoice_id, error = %e, "dispute render failed");
                        None
                    }
                },
            }
        };

        if let Some(at) = moved {
            if let Some(saved) = self.persist_invoice_ref(invoice_id, at) {
                updated = saved;
            }
        }

        notify::invoice_disputed(self.gateway.as_ref(), &updated);

        Ok(updated)
    }

    // Presentation bookkeeping after a commit. Failures are logged, never
    // propagated: the lifecycle transition already stands.
    fn persist_repair_ref(&self, repair_id: &str, at: MessageRef) -> Option<RepairRequest> {
        match self.store.update_repair(repair_id, |mut r| {
            r.message_ref = Some(at.clone());
            Ok(r)
        }) {
            Ok(saved) => Some(saved),
            Err(e) => {
                error!(repair_id, error = %e, "failed to persist message ref");
                None
            }
        }
    }

    fn persist_invoice_ref(&self, invoice_id: &str, at: MessageRef) -> Option<Invoice> {
        match self.store.update_invoice(invoice_id, |mut inv| {
            inv.message_ref = Some(at.clone());
            Ok(inv)
        }) {
            Ok(saved) => Some(saved),
            Err(e) => {
                error!(invoice_id, error = %e, "failed to persist message ref");
                None
            }
        }
    }
}
