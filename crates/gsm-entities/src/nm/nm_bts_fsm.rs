//! BTS object FSM

use gsm_core::{AdminState, AvailState, MoId, OpState};

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static BTS_FSM: FsmDesc = FsmDesc {
    name: "NM_BTS_OP",
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
            in_event_mask: ev_mask!(OmlUp | RxSetAttr | RxOpstart | OpstartAck | OpstartNack),
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

fn bts_nr(id: MoId) -> u8 {
    match id {
        MoId::Bts { bts } => bts,
        _ => unreachable!("{} is not a BTS", id),
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
        }
        NmFsmState::Enabled => {
            mo_state_chg(tree, ctx, id, Some(OpState::Enabled), Some(AvailState::Ok), None);
            dispatch(tree, ctx, MoId::GprsNse, NmEvent::BtsEnabled);
        }
        NmFsmState::Dependency => unreachable!(),
    }

    if prev == NmFsmState::Enabled && tree.mo(id).state() != NmFsmState::Enabled {
        dispatch(tree, ctx, MoId::GprsNse, NmEvent::BtsDisabled);
    }
}

pub(crate) fn handle_event(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    let trx_objs = tree.trx_ids(bts_nr(id));
    if BTS_FSM.is_allstate(ev.kind()) {
        handle_shutdown(tree, ctx, id, &ev, &trx_objs);
        return;
    }

    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled, NmEvent::OmlUp) => {
            // Software is implicitly active once OML is up
            mo_tx_sw_act_rep(ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Offline);
            for mo in trx_objs {
                dispatch_if_permitted(tree, ctx, mo, NmEvent::OmlUp);
            }
        }
        (NmFsmState::Offline, NmEvent::OmlUp) => {
            mo_report_state(tree, ctx, id);
        }
        (NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
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
        (state, ev) => unreachable!("{}: unhandled {} in {}", id, ev, state),
    }
}
