//! Dispatch and helpers shared by all NM object FSMs.
//!
//! Dispatch is synchronous and re-entrant: a handler may dispatch into child
//! objects before returning. Handlers receive the whole tree and look objects
//! up by [`MoId`], so no borrow of one object is held across a nested dispatch.

use gsm_core::{AdminState, AvailState, MoId, NackCause, NmAttributes, OpState, assert_warn};
use gsm_saps::SapMsgInner;
use gsm_saps::oml::{OmlAck, OmlNack, OmlProcedure, OmlStateChgEvRep, OmlSwActivatedRep};

use crate::nm::bts_model::{BtsModel, ModelEvents};
use crate::nm::fsm::NmFsmState;
use crate::nm::nm_event::{NmEvent, NmEventKind};
use crate::nm::nm_tree::NmTree;
use crate::nm::{
    nm_bb_transc_fsm, nm_bts_fsm, nm_bts_sm_fsm, nm_channel_fsm, nm_gprs_nse_fsm, nm_rcarrier_fsm,
};

/// Record of what happened during a dispatch, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NmTrace {
    Dispatch { mo: MoId, ev: NmEventKind },
    StateChg { mo: MoId, from: NmFsmState, to: NmFsmState },
}

/// Everything a handler may touch besides the tree
pub struct NmCtx<'a> {
    pub model: &'a mut dyn BtsModel,
    /// Events raised by the model, dispatched by [`run_pending`]
    pub pending: ModelEvents,
    /// Reports for the BSC, and requests for other entities
    pub outputs: Vec<SapMsgInner>,
    pub trace: Vec<NmTrace>,
}

impl<'a> NmCtx<'a> {
    pub fn new(model: &'a mut dyn BtsModel) -> Self {
        NmCtx {
            model,
            pending: ModelEvents::default(),
            outputs: Vec::new(),
            trace: Vec::new(),
        }
    }
}

// ─── Dispatch ────────────────────────────────────────────────────────

/// Dispatches `ev` into the FSM of `id`. Panics if the current state does not accept it.
pub fn dispatch(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    let mo = tree.mo(id);
    mo.fsm.check_event(id, ev.kind());
    tracing::debug!("{} <- {} in {}", id, ev, mo.state());
    ctx.trace.push(NmTrace::Dispatch { mo: id, ev: ev.kind() });

    match id {
        MoId::SiteManager => nm_bts_sm_fsm::handle_event(tree, ctx, id, ev),
        MoId::GprsNse => nm_gprs_nse_fsm::handle_event(tree, ctx, id, ev),
        MoId::Bts { .. } => nm_bts_fsm::handle_event(tree, ctx, id, ev),
        MoId::RadioCarrier { .. } => nm_rcarrier_fsm::handle_event(tree, ctx, id, ev),
        MoId::BasebandTransceiver { .. } => nm_bb_transc_fsm::handle_event(tree, ctx, id, ev),
        MoId::Channel { .. } => nm_channel_fsm::handle_event(tree, ctx, id, ev),
    }
}

/// Dispatches only if the current state accepts `ev`. Returns whether it was dispatched.
pub fn dispatch_if_permitted(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) -> bool {
    let mo = tree.mo(id);
    if !mo.fsm.permits(ev.kind()) {
        tracing::trace!("{}: {} not accepted in {}, skipped", id, ev, mo.state());
        return false;
    }
    dispatch(tree, ctx, id, ev);
    true
}

/// Dispatches everything the model queued, including events queued meanwhile
pub fn run_pending(tree: &mut NmTree, ctx: &mut NmCtx) {
    while let Some(p) = ctx.pending.pop() {
        if !tree.contains(p.mo) {
            tracing::warn!("model event {} for unknown object {}", p.ev, p.mo);
            continue;
        }
        if p.if_permitted {
            dispatch_if_permitted(tree, ctx, p.mo, p.ev);
        } else {
            dispatch(tree, ctx, p.mo, p.ev);
        }
    }
}

/// Moves `id` to `next` and runs the on-enter action of `next`.
/// Re-entering the current state also runs on-enter, if the state allows it.
pub fn state_chg(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, next: NmFsmState) {
    let prev = tree.mo_mut(id).fsm.transition(id, next);
    tracing::debug!("{}: state {} -> {}", id, prev, next);
    ctx.trace.push(NmTrace::StateChg {
        mo: id,
        from: prev,
        to: next,
    });

    match id {
        MoId::SiteManager => nm_bts_sm_fsm::on_enter(tree, ctx, id, prev),
        MoId::GprsNse => nm_gprs_nse_fsm::on_enter(tree, ctx, id, prev),
        MoId::Bts { .. } => nm_bts_fsm::on_enter(tree, ctx, id, prev),
        MoId::RadioCarrier { .. } => nm_rcarrier_fsm::on_enter(tree, ctx, id, prev),
        MoId::BasebandTransceiver { .. } => nm_bb_transc_fsm::on_enter(tree, ctx, id, prev),
        MoId::Channel { .. } => nm_channel_fsm::on_enter(tree, ctx, id, prev),
    }
}

// ─── Reports ─────────────────────────────────────────────────────────

/// Updates the state triple of `id`. `None` leaves a component unchanged.
/// A State Changed report is sent only if the triple changed.
pub fn mo_state_chg(
    tree: &mut NmTree,
    ctx: &mut NmCtx,
    id: MoId,
    op: Option<OpState>,
    avail: Option<AvailState>,
    admin: Option<AdminState>,
) {
    let mo = tree.mo_mut(id);
    let old = mo.nm_state;
    let mut new = old;
    if let Some(op) = op {
        new.operational = op;
    }
    if let Some(avail) = avail {
        new.availability = avail;
    }
    if let Some(admin) = admin {
        new.administrative = admin;
    }
    assert_warn!(new.is_consistent(), "{} entering inconsistent state {}", id, new);

    if new == old {
        return;
    }
    mo.nm_state = new;
    tracing::info!("-> {} state {} -> {}", id, old, new);
    ctx.outputs
        .push(SapMsgInner::OmlStateChgEvRep(OmlStateChgEvRep { mo: id, state: new }));
}

/// Re-sends the current state triple
pub fn mo_report_state(tree: &NmTree, ctx: &mut NmCtx, id: MoId) {
    let state = tree.mo(id).nm_state;
    tracing::debug!("-> {} state report {}", id, state);
    ctx.outputs
        .push(SapMsgInner::OmlStateChgEvRep(OmlStateChgEvRep { mo: id, state }));
}

pub fn mo_tx_sw_act_rep(ctx: &mut NmCtx, id: MoId) {
    tracing::debug!("-> {} SW activated report", id);
    ctx.outputs
        .push(SapMsgInner::OmlSwActivatedRep(OmlSwActivatedRep { mo: id }));
}

fn tx_ack(ctx: &mut NmCtx, id: MoId, procedure: OmlProcedure) {
    ctx.outputs.push(SapMsgInner::OmlAck(OmlAck { mo: id, procedure }));
}

fn tx_nack(ctx: &mut NmCtx, id: MoId, procedure: OmlProcedure, cause: NackCause) {
    tracing::info!("-> {} {:?} NACK cause 0x{:02x}", id, procedure, cause.into_raw());
    ctx.outputs
        .push(SapMsgInner::OmlNack(OmlNack { mo: id, procedure, cause }));
}

// ─── Procedures ──────────────────────────────────────────────────────

/// Clears both procedure flags and the cached attributes
pub fn mo_reset(tree: &mut NmTree, id: MoId) {
    let mo = tree.mo_mut(id);
    mo.setattr_success = false;
    mo.opstart_success = false;
    mo.attrs = None;
}

/// Hands Set Attributes to the model, records the outcome and acks or nacks it
pub fn mo_setattr(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, attrs: NmAttributes) {
    let rc = ctx.model.apply_attributes(id, &attrs, &mut ctx.pending);
    let mo = tree.mo_mut(id);
    mo.setattr_success = rc.is_ok();
    match rc {
        Ok(()) => {
            mo.store_attrs(&attrs);
            tx_ack(ctx, id, OmlProcedure::SetAttr);
        }
        Err(cause) => tx_nack(ctx, id, OmlProcedure::SetAttr, cause),
    }
}

/// Set Attributes on an object without hardware behind it
pub fn mo_setattr_synthetic(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, attrs: NmAttributes) {
    let mo = tree.mo_mut(id);
    mo.setattr_success = true;
    mo.store_attrs(&attrs);
    tx_ack(ctx, id, OmlProcedure::SetAttr);
}

/// Hands Opstart to the model. With `gated`, refuses unless the last Set Attributes succeeded.
pub fn mo_opstart(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, gated: bool) {
    if gated && !tree.mo(id).setattr_success {
        tx_nack(ctx, id, OmlProcedure::Opstart, NackCause::CantPerform);
        return;
    }
    ctx.model.opstart(id, &mut ctx.pending);
}

pub fn mo_opstart_ack(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId) {
    tree.mo_mut(id).opstart_success = true;
    tx_ack(ctx, id, OmlProcedure::Opstart);
}

pub fn mo_opstart_nack(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, cause: NackCause) {
    tree.mo_mut(id).opstart_success = false;
    tx_nack(ctx, id, OmlProcedure::Opstart, cause);
}

/// Acks or nacks Change Administrative State
pub fn mo_chg_adm_state(ctx: &mut NmCtx, id: MoId, rc: Result<(), NackCause>) {
    match rc {
        Ok(()) => tx_ack(ctx, id, OmlProcedure::ChgAdmState),
        Err(cause) => tx_nack(ctx, id, OmlProcedure::ChgAdmState, cause),
    }
}

/// Handles the shutdown pair the same way in every object:
/// START announces the shutdown, FINISH uninstalls the object.
/// Children are visited after START is announced and before FINISH is applied.
pub fn handle_shutdown(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: &NmEvent, children: &[MoId]) {
    match ev {
        NmEvent::ShutdownStart => {
            mo_state_chg(tree, ctx, id, None, None, Some(AdminState::Shutdown));
            for child in children {
                dispatch(tree, ctx, *child, NmEvent::ShutdownStart);
            }
        }
        NmEvent::ShutdownFinish => {
            for child in children {
                dispatch(tree, ctx, *child, NmEvent::ShutdownFinish);
            }
            state_chg(tree, ctx, id, NmFsmState::NotInstalled);
        }
        _ => unreachable!("{}: {} is not a shutdown event", id, ev),
    }
}

/// TRX objects become operative once RSL, PHY and Opstart are all done
pub fn trx_mo_try_enable(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId) {
    let (bts, trx) = match id {
        MoId::RadioCarrier { bts, trx } | MoId::BasebandTransceiver { bts, trx } => (bts, trx),
        _ => unreachable!("{} is not a TRX object", id),
    };
    let (rsl, phy) = tree.trx_links(bts, trx);
    let opstart = tree.mo(id).opstart_success;
    if rsl && phy && opstart {
        state_chg(tree, ctx, id, NmFsmState::Enabled);
    } else {
        tracing::info!(
            "{}: delay switch to operative state Enabled, wait for:{}{}{}",
            id,
            if rsl { "" } else { " rsl" },
            if phy { "" } else { " phy" },
            if opstart { "" } else { " opstart" },
        );
    }
}
