//! Site Manager object FSM, root of the NM tree.
//!
//! There is no hardware behind the site manager: Set Attributes always
//! succeeds and Opstart is accepted without waiting for it.

use gsm_core::{AdminState, AvailState, MoId, OpState};

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static BTS_SM_FSM: FsmDesc = FsmDesc {
    name: "NM_BTS_SM_OP",
    states: [
        // NotInstalled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(OmlUp),
            out_state_mask: st_mask!(NotInstalled | Offline),
        }),
        // Dependency
        None,
        // Offline
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(RxSetAttr | RxOpstart | OpstartAck | OpstartNack),
            out_state_mask: st_mask!(NotInstalled | Enabled),
        }),
        // Enabled
        Some(FsmStateDesc {
            in_event_mask: 0,
            out_state_mask: st_mask!(NotInstalled),
        }),
    ],
    allstate_event_mask: ev_mask!(ShutdownStart | ShutdownFinish),
};

pub(crate) fn on_enter(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, _prev: NmFsmState) {
    match tree.mo(id).state() {
        NmFsmState::NotInstalled => {
            let mo = tree.mo_mut(id);
            mo.setattr_success = false;
            mo.opstart_success = false;
            mo_state_chg(
                tree,
                ctx,
                id,
                Some(OpState::Disabled),
                Some(AvailState::NotInstalled),
                Some(AdminState::Locked),
            );
        }
        NmFsmState::Offline => {
            let mo = tree.mo_mut(id);
            mo.setattr_success = false;
            mo.opstart_success = false;
            mo_state_chg(tree, ctx, id, Some(OpState::Disabled), Some(AvailState::OffLine), None);
        }
        NmFsmState::Enabled => {
            mo_state_chg(tree, ctx, id, Some(OpState::Enabled), Some(AvailState::Ok), None);
        }
        NmFsmState::Dependency => unreachable!(),
    }
}

pub(crate) fn handle_event(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    let children = tree.site_children();
    if BTS_SM_FSM.is_allstate(ev.kind()) {
        handle_shutdown(tree, ctx, id, &ev, &children);
        return;
    }

    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled, NmEvent::OmlUp) => {
            mo_tx_sw_act_rep(ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Offline);
            for child in children {
                dispatch(tree, ctx, child, NmEvent::OmlUp);
            }
        }
        (NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
            mo_setattr_synthetic(tree, ctx, id, attrs);
        }
        (NmFsmState::Offline, NmEvent::RxOpstart) => {
            mo_opstart(tree, ctx, id, false);
        }
        (NmFsmState::Offline, NmEvent::OpstartAck) => {
            mo_opstart_ack(tree, ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Enabled);
        }
        (NmFsmState::Offline, NmEvent::OpstartNack(cause)) => {
            mo_opstart_nack(tree, ctx, id, cause);
        }
        (state, ev) => unreachable!("{}: unhandled {} in {}", id, ev, state),
    }
}
