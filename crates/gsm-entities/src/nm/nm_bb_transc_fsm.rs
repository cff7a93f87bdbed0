//! Baseband Transceiver object FSM.
//!
//! Owns the channel objects of its TRX: software activation, OML up and the
//! shutdown pair are passed down to them, and they are told when the
//! transceiver becomes usable.

use gsm_core::{AdminState, AvailState, MoId, OpState};

use crate::nm::fsm::{FsmDesc, FsmStateDesc, NmFsmState};
use crate::nm::nm_common::*;
use crate::nm::nm_event::NmEvent;
use crate::nm::nm_tree::NmTree;
use crate::{ev_mask, st_mask};

pub static BB_TRANSC_FSM: FsmDesc = FsmDesc {
    name: "NM_BBTRANSC_OP",
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

fn children(tree: &NmTree, id: MoId) -> Vec<MoId> {
    match id {
        MoId::BasebandTransceiver { bts, trx } => tree.ts_ids(bts, trx),
        _ => unreachable!("{} is not a baseband transceiver", id),
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
                for ts in children(tree, id) {
                    dispatch_if_permitted(tree, ctx, ts, NmEvent::BbTranscDisabled);
                }
            }
        }
        NmFsmState::Enabled => {
            mo_state_chg(tree, ctx, id, Some(OpState::Enabled), Some(AvailState::Ok), None);
            // Channels waiting in DEPENDENCY may now go OFFLINE
            for ts in children(tree, id) {
                dispatch_if_permitted(tree, ctx, ts, NmEvent::BbTranscEnabled);
            }
        }
        NmFsmState::Dependency => unreachable!(),
    }
}

pub(crate) fn handle_event(tree: &mut NmTree, ctx: &mut NmCtx, id: MoId, ev: NmEvent) {
    if BB_TRANSC_FSM.is_allstate(ev.kind()) {
        let ts_list = children(tree, id);
        handle_shutdown(tree, ctx, id, &ev, &ts_list);
        return;
    }

    let state = tree.mo(id).state();
    match (state, ev) {
        (NmFsmState::NotInstalled, NmEvent::SwAct) => {
            mo_tx_sw_act_rep(ctx, id);
            state_chg(tree, ctx, id, NmFsmState::Offline);
            for ts in children(tree, id) {
                dispatch(tree, ctx, ts, NmEvent::SwAct);
            }
        }
        (NmFsmState::NotInstalled | NmFsmState::Offline, NmEvent::OmlUp) => {
            mo_report_state(tree, ctx, id);
            for ts in children(tree, id) {
                dispatch_if_permitted(tree, ctx, ts, NmEvent::OmlUp);
            }
        }
        (
            NmFsmState::NotInstalled,
            NmEvent::RslUp | NmEvent::RslDown | NmEvent::PhyLinkUp | NmEvent::PhyLinkDown | NmEvent::Disable,
        ) => {}
        (NmFsmState::Offline, NmEvent::RxSetAttr(attrs)) => {
            mo_setattr(tree, ctx, id, attrs);
        }
        (NmFsmState::Offline, NmEvent::RxOpstart) => {
            // Not gated on Set Attributes, BSCs do not always send one for this class
            mo_opstart(tree, ctx, id, false);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nm::bts_model::VirtualModel;

    const BB: MoId = MoId::BasebandTransceiver { bts: 0, trx: 0 };
    const TS3: MoId = MoId::Channel { bts: 0, trx: 0, ts: 3 };

    #[test]
    fn test_sw_act_fans_out_to_channels() {
        let mut tree = NmTree::new(1, true, false);
        let mut model = VirtualModel::new(1);
        let mut ctx = NmCtx::new(&mut model);

        dispatch(&mut tree, &mut ctx, BB, NmEvent::SwAct);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Offline);
        for ts in tree.ts_ids(0, 0) {
            assert_eq!(tree.mo(ts).state(), NmFsmState::Dependency);
        }
    }

    #[test]
    fn test_enable_waits_for_links() {
        let mut tree = NmTree::new(1, false, false);
        let mut model = VirtualModel::new(1);
        let mut ctx = NmCtx::new(&mut model);

        dispatch(&mut tree, &mut ctx, BB, NmEvent::SwAct);
        dispatch(&mut tree, &mut ctx, BB, NmEvent::RxOpstart);
        run_pending(&mut tree, &mut ctx);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Offline);
        assert!(tree.mo(BB).opstart_success);

        tree.trx_mut(0, 0).unwrap().rsl_connected = true;
        dispatch(&mut tree, &mut ctx, BB, NmEvent::RslUp);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Offline);

        tree.trx_mut(0, 0).unwrap().phy_connected = true;
        dispatch(&mut tree, &mut ctx, BB, NmEvent::PhyLinkUp);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Enabled);
        // Carrier dependency disabled, channels follow the transceiver
        assert_eq!(tree.mo(TS3).state(), NmFsmState::Offline);

        dispatch(&mut tree, &mut ctx, BB, NmEvent::PhyLinkDown);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Offline);
        assert_eq!(tree.mo(TS3).state(), NmFsmState::Dependency);
    }

    #[test]
    fn test_dummy_links() {
        let mut tree = NmTree::new(1, false, true);
        let mut model = VirtualModel::new(1);
        let mut ctx = NmCtx::new(&mut model);

        dispatch(&mut tree, &mut ctx, BB, NmEvent::SwAct);
        dispatch(&mut tree, &mut ctx, BB, NmEvent::OpstartAck);
        assert_eq!(tree.mo(BB).state(), NmFsmState::Enabled);
        assert!(tree.mo(BB).nm_state.is_consistent());
    }

    #[test]
    fn test_shutdown_reaches_channels() {
        let mut tree = NmTree::new(1, false, true);
        let mut model = VirtualModel::new(1);
        let mut ctx = NmCtx::new(&mut model);

        dispatch(&mut tree, &mut ctx, BB, NmEvent::SwAct);
        dispatch(&mut tree, &mut ctx, BB, NmEvent::ShutdownStart);
        assert_eq!(tree.mo(TS3).nm_state.administrative, AdminState::Shutdown);
        dispatch(&mut tree, &mut ctx, BB, NmEvent::ShutdownFinish);
        assert_eq!(tree.mo(BB).state(), NmFsmState::NotInstalled);
        assert_eq!(tree.mo(TS3).state(), NmFsmState::NotInstalled);
        assert_eq!(tree.mo(TS3).nm_state.administrative, AdminState::Locked);
    }
}
