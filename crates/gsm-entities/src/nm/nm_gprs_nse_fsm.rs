//! GPRS NSE object FSM. The NSE depends on BTS 0 being enabled.

use gsm_core::{AdminState, AvailState, MoId, OpState};

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static GPRS_NSE_FSM: FsmDesc = FsmDesc {
    name: "NM_GPRS_NSE_OP",
    states: [
        // NotInstalled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(OmlUp | BtsEnabled | BtsDisabled),
            out_state_mask: st_mask!(NotInstalled | Dependency | Offline),
        }),
        // Dependency
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(OmlUp | RxSetAttr | BtsEnabled | BtsDisabled),
            out_state_mask: st_mask!(NotInstalled | Offline),
        }),
        // Offline
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(OmlUp | RxSetAttr | RxOpstart | OpstartAck | OpstartNack | BtsEnabled | BtsDisabled),
            out_state_mask: st_mask!(NotInstalled | Enabled | Dependency),
        }),
        // Enabled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(BtsEnabled | BtsDisabled),
            out_state_mask: st_mask!(NotInstalled | Dependency),
        }),
    ],
    allstate_event_mask: ev_mask!(ShutdownStart | ShutdownFinish),
};

fn nse_can_be_enabled(tree: &NmTree) -> bool {
    tree.bts.first().is_some_and(|b| b.mo.is_enabled())
}

pub(crate) fn on_enter(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, _prev: NmFsmState) {
    match tree.mo(id).state() {
        NmFsmState::NotInstalled => {
            mo_reset(tree, id);
            mo_state_chg(
                tree,
                ctx,
                id,
                Some(OpState::Disabled),
                Some(AvailState::NotInstalled),
                Some(AdminState::Locked),
            );
        }
        NmFsmState::Dependency => {
            tree.mo_mut(id).opstart_success = false;
            mo_state_chg(tree, ctx, id, Some(OpState::Disabled), Some(AvailState::Dependency), None);
        }
        NmFsmState::Offline => {
            tree.mo_mut(id).opstart_success = false;
            mo_state_chg(tree, ctx, id, Some(OpState::Disabled), Some(AvailState::OffLine), None);
        }
        NmFsmState::Enabled => {
            mo_state_chg(tree, ctx, id, Some(OpState::Enabled), Some(AvailState::Ok), None);
        }
    }
}

pub(crate) fn handle_event(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    if GPRS_NSE_FSM.is_allstate(ev.kind()) {
        handle_shutdown(tree, ctx, id, &ev, &[]);
        return;
    }

    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled, NmEvent::OmlUp) => {
            mo_tx_sw_act_rep(ctx, id);
            let next = if nse_can_be_enabled(tree) {
                NmFsmState::Offline
            } else {
                NmFsmState::Dependency
            };
            state_chg(tree, ctx, id, next);
        }
        (NmFsmState::Dependency | NmFsmState::Offline, NmEvent::OmlUp) => {
            mo_report_state(tree, ctx, id);
        }
        (NmFsmState::Dependency | NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
            mo_setattr(tree, ctx, id, attrs);
        }
        (NmFsmState::Offline, NmEvent::RxOpstart) => {
            mo_opstart(tree, ctx, id, true);
        }
        (NmFsmState::Offline, NmEvent::OpstartAck) => {
            mo_opstart_ack(tree, ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Enabled);
        }
        (NmFsmState::Offline, NmEvent::OpstartNack(cause)) => {
            mo_opstart_nack(tree, ctx, id, cause);
        }
        (NmFsmState::Dependency, NmEvent::BtsEnabled) => {
            state_chg(tree, ctx, id, NmFsmState::Offline);
        }
        (NmFsmState::Offline | NmFsmState::Enabled, NmEvent::BtsDisabled) => {
            state_chg(tree, ctx, id, NmFsmState::Dependency);
        }
        (_, NmEvent::BtsEnabled | NmEvent::BtsDisabled) => {}
        (state, ev) => unreachable!("{}: unhandled {} in {}", id, ev, state),
    }
}
