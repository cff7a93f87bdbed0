mod common;

use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{AdminState, GsmTime, MoId, NackCause, NmAttributes, OpState, Pchan, Sap, debug};
use gsm_entities::nm::fsm::NmFsmState;
use gsm_entities::nm::oml_bs::Oml;
use gsm_saps::control::{LinkControl, TsReleaseReq};
use gsm_saps::oml::{OmlAck, OmlChgAdmStateReq, OmlNack, OmlOpstartReq, OmlProcedure, OmlSetAttrReq, OmlStateChgEvRep};
use gsm_saps::sapmsg::{SapMsg, SapMsgInner};

use common::{ComponentTest, default_test_config};

const BTS: MoId = MoId::Bts { bts: 0 };
const RC: MoId = MoId::RadioCarrier { bts: 0, trx: 0 };
const BB: MoId = MoId::BasebandTransceiver { bts: 0, trx: 0 };
const TS1: MoId = MoId::Channel { bts: 0, trx: 0, ts: 1 };

fn link(src: BtsEntity, ctrl: LinkControl) -> SapMsg {
    SapMsg::new(Sap::Control, src, BtsEntity::Oml, GsmTime::default(), SapMsgInner::LinkControl(ctrl))
}

fn from_bsc(msg: SapMsgInner) -> SapMsg {
    SapMsg::new(Sap::OmlSap, BtsEntity::Abis, BtsEntity::Oml, GsmTime::default(), msg)
}

fn set_attr(mo: MoId, attrs: NmAttributes) -> SapMsg {
    from_bsc(SapMsgInner::OmlSetAttrReq(OmlSetAttrReq { mo, attrs }))
}

fn opstart(mo: MoId) -> SapMsg {
    from_bsc(SapMsgInner::OmlOpstartReq(OmlOpstartReq { mo }))
}

fn state(test: &mut ComponentTest, mo: MoId) -> NmFsmState {
    test.oml().tree().mo(mo).state()
}

fn acks(msgs: &[SapMsg], procedure: OmlProcedure) -> Vec<MoId> {
    msgs.iter()
        .filter_map(|m| match &m.msg {
            SapMsgInner::OmlAck(OmlAck { mo, procedure: p }) if *p == procedure => Some(*mo),
            _ => None,
        })
        .collect()
}

/// Brings the stack up to the point where the BSC starts configuring objects
fn setup() -> ComponentTest {
    debug::setup_logging_verbose();
    let mut test = ComponentTest::new(default_test_config(), None);
    test.populate_entities(vec![BtsEntity::Oml], vec![BtsEntity::Abis, BtsEntity::L1sap]);

    test.submit_message(link(BtsEntity::Phy, LinkControl::PhyLinkUp { trx: 0 }));
    test.submit_message(link(BtsEntity::Abis, LinkControl::OmlLinkUp));
    test.submit_message(link(BtsEntity::Abis, LinkControl::RslLinkUp { trx: 0 }));
    test.deliver_all_messages();
    test
}

#[test]
fn test_link_up_installs_objects() {
    let mut test = setup();

    assert_eq!(state(&mut test, MoId::SiteManager), NmFsmState::Offline);
    assert_eq!(state(&mut test, MoId::GprsNse), NmFsmState::Dependency);
    assert_eq!(state(&mut test, BTS), NmFsmState::Offline);
    assert_eq!(state(&mut test, RC), NmFsmState::Offline);
    assert_eq!(state(&mut test, BB), NmFsmState::Offline);
    // Neither carrier nor transceiver is enabled yet
    assert_eq!(state(&mut test, TS1), NmFsmState::Dependency);
    assert!(test.get_shared_config().state_read().oml_link_up);
    assert!(test.get_shared_config().state_read().phy_link_up);

    let msgs = test.dump_sink(BtsEntity::Abis);
    let sw_act: Vec<MoId> = msgs
        .iter()
        .filter_map(|m| match &m.msg {
            SapMsgInner::OmlSwActivatedRep(rep) => Some(rep.mo),
            _ => None,
        })
        .collect();
    assert!(sw_act.contains(&MoId::SiteManager));
    assert!(sw_act.contains(&MoId::GprsNse));
    assert!(sw_act.contains(&BTS));
    assert!(sw_act.contains(&RC));
    assert!(sw_act.contains(&TS1));
    assert!(msgs.iter().all(|m| m.sap == Sap::OmlSap));
}

#[test]
fn test_full_configuration() {
    let mut test = setup();
    test.dump_sinks();

    // BTS
    test.submit_message(set_attr(BTS, NmAttributes { bsic: Some(63), ..Default::default() }));
    test.submit_message(opstart(BTS));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, BTS), NmFsmState::Enabled);
    assert_eq!(state(&mut test, MoId::GprsNse), NmFsmState::Offline);

    // Radio carrier first: the channels still wait for the transceiver
    test.submit_message(set_attr(RC, NmAttributes { arfcn: Some(871), ..Default::default() }));
    test.submit_message(opstart(RC));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, RC), NmFsmState::Enabled);
    assert_eq!(state(&mut test, TS1), NmFsmState::Dependency);

    // Baseband transceiver opstart does not need Set Attributes
    test.submit_message(opstart(BB));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, BB), NmFsmState::Enabled);
    assert_eq!(state(&mut test, TS1), NmFsmState::Offline);

    test.submit_message(set_attr(
        TS1,
        NmAttributes {
            pchan: Some(Pchan::TchF),
            tsc: Some(7),
            ..Default::default()
        },
    ));
    test.submit_message(opstart(TS1));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, TS1), NmFsmState::Enabled);
    assert_eq!(test.oml().tree().mo(TS1).attrs.as_ref().and_then(|a| a.pchan), Some(Pchan::TchF));

    let msgs = test.dump_sink(BtsEntity::Abis);
    assert_eq!(acks(&msgs, OmlProcedure::SetAttr), vec![BTS, RC, TS1]);
    assert_eq!(acks(&msgs, OmlProcedure::Opstart), vec![BTS, RC, BB, TS1]);

    // Channel reports enabled to the BSC
    assert!(msgs.iter().any(|m| matches!(
        &m.msg,
        SapMsgInner::OmlStateChgEvRep(OmlStateChgEvRep { mo, state }) if *mo == TS1 && state.operational == OpState::Enabled
    )));
}

#[test]
fn test_nacks() {
    let mut test = setup();
    test.dump_sinks();

    // Unknown object
    test.submit_message(opstart(MoId::Channel { bts: 0, trx: 3, ts: 0 }));
    // Channel opstart before Set Attributes
    test.submit_message(opstart(TS1));
    // Carrier with an ARFCN the model cannot use
    test.submit_message(set_attr(RC, NmAttributes { arfcn: Some(2000), ..Default::default() }));
    test.deliver_all_messages();

    let nacks: Vec<(MoId, OmlProcedure, NackCause)> = test
        .dump_sink(BtsEntity::Abis)
        .into_iter()
        .filter_map(|m| match m.msg {
            SapMsgInner::OmlNack(OmlNack { mo, procedure, cause }) => Some((mo, procedure, cause)),
            _ => None,
        })
        .collect();
    assert_eq!(
        nacks,
        vec![
            (MoId::Channel { bts: 0, trx: 3, ts: 0 }, OmlProcedure::Opstart, NackCause::ObjInstanceUnknown),
            (TS1, OmlProcedure::Opstart, NackCause::CantPerform),
            (RC, OmlProcedure::SetAttr, NackCause::FreqNotAvailable),
        ]
    );
    assert!(!test.oml().tree().mo(RC).setattr_success);
}

#[test]
fn test_lock_channel() {
    let mut test = setup();
    test.submit_message(opstart(BB));
    test.submit_message(set_attr(RC, NmAttributes::default()));
    test.submit_message(opstart(RC));
    test.submit_message(set_attr(TS1, NmAttributes::default()));
    test.submit_message(opstart(TS1));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, TS1), NmFsmState::Enabled);
    test.dump_sinks();

    test.submit_message(from_bsc(SapMsgInner::OmlChgAdmStateReq(OmlChgAdmStateReq {
        mo: TS1,
        admin: AdminState::Locked,
    })));
    test.deliver_all_messages();
    assert_eq!(state(&mut test, TS1), NmFsmState::Offline);
    assert_eq!(test.oml().tree().mo(TS1).nm_state.administrative, AdminState::Locked);
    let msgs = test.dump_sink(BtsEntity::Abis);
    assert_eq!(acks(&msgs, OmlProcedure::ChgAdmState), vec![TS1]);
}

#[test]
fn test_abis_failure_shuts_down_tree() {
    let mut test = setup();
    test.submit_message(opstart(BB));
    test.deliver_all_messages();
    test.dump_sinks();

    test.submit_message(link(BtsEntity::Abis, LinkControl::AbisLinkFailed));
    test.deliver_all_messages();

    for mo in [MoId::SiteManager, MoId::GprsNse, BTS, RC, BB, TS1] {
        assert_eq!(state(&mut test, mo), NmFsmState::NotInstalled, "{}", mo);
    }
    assert!(!test.get_shared_config().state_read().oml_link_up);

    // Every timeslot is released in L1
    let released: Vec<u8> = test
        .dump_sink(BtsEntity::L1sap)
        .into_iter()
        .filter_map(|m| match m.msg {
            SapMsgInner::TsReleaseReq(TsReleaseReq { trx: 0, ts }) => Some(ts),
            _ => None,
        })
        .collect();
    assert_eq!(released, (0..8).collect::<Vec<u8>>());

    let oml = test.oml();
    let model = oml.model().as_any().downcast_ref::<gsm_entities::nm::bts_model::VirtualModel>().unwrap();
    assert!(model.is_closed());

    // Oml asks the router to stop
    test.run_stack(Some(10));
    assert_eq!(test.router.get_dl_time(), GsmTime::new(1));
}

#[test]
fn test_oml_entity_type() {
    let mut test = setup();
    // Downcast through the router works for the concrete type only
    assert!(test.router.get_entity(BtsEntity::Oml).unwrap().as_any().downcast_ref::<Oml>().is_some());
}
