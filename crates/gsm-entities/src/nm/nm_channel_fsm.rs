//! Channel (timeslot) object FSM, TS 12.21 section 8.
//!
//! A channel waits in DEPENDENCY until its TRX can carry traffic, see
//! [`NmTree::ts_can_be_enabled`].

use gsm_core::{AdminState, AvailState, MoId, OpState};
use gsm_saps::SapMsgInner;
use gsm_saps::control::TsReleaseReq;

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static CHANNEL_FSM: FsmDesc = FsmDesc {
    name: "NM_CHAN_OP",
    states: [
        // NotInstalled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(SwAct | OmlUp),
            out_state_mask: st_mask!(NotInstalled | Offline | Dependency),
        }),
        // Dependency
        Some(FsmStateDesc {
            // Opstart here only serves BSCs that skip waiting for OFFLINE
            in_event_mask: ev_mask!(
                OmlUp
                    | RxSetAttr
                    | RxOpstart
                    | OpstartAck
                    | OpstartNack
                    | BbTranscEnabled
                    | RcarrierEnabled
                    | BbTranscDisabled
                    | RcarrierDisabled
            ),
            out_state_mask: st_mask!(NotInstalled | Offline | Enabled),
        }),
        // Offline
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(
                OmlUp | RxSetAttr | RxOpstart | OpstartAck | OpstartNack | BbTranscDisabled | RcarrierDisabled
            ),
            out_state_mask: st_mask!(NotInstalled | Enabled | Dependency),
        }),
        // Enabled
        Some(FsmStateDesc {
            in_event_mask: ev_mask!(BbTranscDisabled | RcarrierDisabled | Disable),
            out_state_mask: st_mask!(NotInstalled | Offline | Dependency),
        }),
    ],
    allstate_event_mask: ev_mask!(ShutdownStart | ShutdownFinish),
};

fn trx_of(id: MoId) -> (u8, u8, u8) {
    match id {
        MoId::Channel { bts, trx, ts } => (bts, trx, ts),
        _ => unreachable!("{} is not a channel", id),
    }
}

pub(crate) fn on_enter(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, _prev: NmFsmState) {
    match tree.mo(id).state() {
        NmFsmState::NotInstalled => {
            let (_, trx, ts) = trx_of(id);
            ctx.outputs
                .push(SapMsgInner::TsReleaseReq(TsReleaseReq { trx, ts }));
            ctx.model.ts_release(id);
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
    if CHANNEL_FSM.is_allstate(ev.kind()) {
        handle_shutdown(tree, ctx, id, &ev, &[]);
        return;
    }

    let (bts, trx, _) = trx_of(id);
    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled | NmFsmState::Dependency | NmFsmState::Offline, NmEvent::OmlUp) => {
            mo_report_state(tree, ctx, id);
        }
        (NmFsmState::NotInstalled, NmEvent::SwAct) => {
            mo_tx_sw_act_rep(ctx, id);
            let next = if tree.ts_can_be_enabled(bts, trx) {
                NmFsmState::Offline
            } else {
                NmFsmState::Dependency
            };
            state_chg(tree, ctx, id, next);
        }
        (NmFsmState::Dependency | NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
            mo_setattr(tree, ctx, id, attrs);
        }
        (NmFsmState::Dependency, NmEvent::RxOpstart) => {
            tracing::warn!(
                "{}: BSC activates channel while still in dependency, allowed for compatibility",
                id
            );
            mo_opstart(tree, ctx, id, true);
        }
        (NmFsmState::Offline, NmEvent::RxOpstart) => {
            mo_opstart(tree, ctx, id, true);
        }
        (NmFsmState::Dependency | NmFsmState::Offline, NmEvent::OpstartAck) => {
            mo_opstart_ack(tree, ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Enabled);
        }
        (NmFsmState::Dependency | NmFsmState::Offline, NmEvent::OpstartNack(cause)) => {
            mo_opstart_nack(tree, ctx, id, cause);
        }
        (NmFsmState::Dependency, NmEvent::BbTranscEnabled | NmEvent::RcarrierEnabled) => {
            if tree.ts_can_be_enabled(bts, trx) {
                state_chg(tree, ctx, id, NmFsmState::Offline);
            }
        }
        (NmFsmState::Dependency, NmEvent::BbTranscDisabled | NmEvent::RcarrierDisabled) => {
            // Still waiting for both
        }
        (NmFsmState::Offline | NmFsmState::Enabled, NmEvent::BbTranscDisabled | NmEvent::RcarrierDisabled) => {
            if !tree.ts_can_be_enabled(bts, trx) {
                state_chg(tree, ctx, id, NmFsmState::Dependency);
            }
        }
        (NmFsmState::Enabled, NmEvent::Disable) => {
            state_chg(tree, ctx, id, NmFsmState::Offline);
        }
        (state, ev) => unreachable!("{}: unhandled {} in {}", id, ev, state),
    }
}
