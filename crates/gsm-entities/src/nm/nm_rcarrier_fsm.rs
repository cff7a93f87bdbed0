//! Radio Carrier object FSM

use gsm_core::{AdminState, AvailState, MoId, OpState};

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static RCARRIER_FSM: FsmDesc = FsmDesc {
    name: "NM_RCARRIER_OP",
    states: [
        // NotInstalled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(SwAct | OmlUp | RslUp | RslDown | PhyLinkUp | PhyLinkDown | Disable),
            out_state_mask: st_mask!(NotInstalled | Offline),
        }),
        // Dependency
        None,
        // Offline
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(
                OmlUp
                    | RxSetAttr
                    | RxOpstart
                    | OpstartAck
                    | OpstartNack
                    | RslUp
                    | RslDown
                    | PhyLinkUp
                    | PhyLinkDown
                    | Disable
            ),
            out_state_mask: st_mask!(NotInstalled | Enabled),
        }),
        // Enabled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(RslDown | PhyLinkDown | Disable),
            out_state_mask: st_mask!(NotInstalled | Offline),
        }),
    ],
    allstate_event_mask: ev_mask!(ShutdownStart | ShutdownFinish),
};

fn channels(tree: &NmTree, id: MoId) -> Vec<MoId> {
    match id {
        MoId::RadioCarrier { bts, trx } => tree.ts_ids(bts, trx),
        _ => unreachable!("{} is not a radio carrier", id),
    }
}

pub(crate) fn on_enter(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, prev: NmFsmState) {
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
        NmFsmState::Offline => {
            let mo = tree.mo_mut(id);
            mo.setattr_success = false;
            mo.opstart_success = false;
            mo_state_chg(tree, ctx, id, Some(OpState::Disabled), Some(AvailState::OffLine), None);
            if prev == NmFsmState::Enabled {
                for ts in channels(tree, id) {
                    dispatch_if_permitted(tree, ctx, ts, NmEvent::RcarrierDisabled);
                }
            }
        }
        NmFsmState::Enabled => {
            mo_state_chg(tree, ctx, id, Some(OpState::Enabled), Some(AvailState::Ok), None);
            for ts in channels(tree, id) {
                dispatch_if_permitted(tree, ctx, ts, NmEvent::RcarrierEnabled);
            }
        }
        NmFsmState::Dependency => unreachable!(),
    }
}

pub(crate) fn handle_event(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    if RCARRIER_FSM.is_allstate(ev.kind()) {
        handle_shutdown(tree, ctx, id, &ev, &[]);
        return;
    }

    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled, NmEvent::SwAct) => {
            mo_tx_sw_act_rep(ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Offline);
        }
        (NmFsmState::NotInstalled | NmFsmState::Offline, NmEvent::OmlUp) => {
            mo_report_state(tree, ctx, id);
        }
        (
            NmFsmState::NotInstalled,
            NmEvent::RslUp | NmEvent::RslDown | NmEvent::PhyLinkUp | NmEvent::PhyLinkDown | NmEvent::Disable,
        ) => {}
        (NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
            mo_setattr(tree, ctx, id, attrs);
        }
        (NmFsmState::Offline, NmEvent::RxOpstart) => {
            mo_opstart(tree, ctx, id, true);
        }
        (NmFsmState::Offline, NmEvent::OpstartAck) => {
            mo_opstart_ack(tree, ctx, id);
            trx_mo_try_enable(tree, ctx, id);
        }
        (NmFsmState::Offline, NmEvent::OpstartNack(cause)) => {
            mo_opstart_nack(tree, ctx, id, cause);
        }
        (NmFsmState::Offline, NmEvent::RslUp | NmEvent::PhyLinkUp) => {
            trx_mo_try_enable(tree, ctx, id);
        }
        (NmFsmState::Offline, NmEvent::RslDown | NmEvent::PhyLinkDown | NmEvent::Disable) => {}
        (NmFsmState::Enabled, NmEvent::RslDown | NmEvent::PhyLinkDown | NmEvent::Disable) => {
            state_chg(tree, ctx, id, NmFsmState::Offline);
        }
        (state, ev) => unreachable!("{}: unhandled {} in {}", id, ev, state),
    }
}
