mod common;

use gsm_core::band::dbm2rxlev;
use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{ChanNr, GsmTime, LchanType, Pchan, Sap, TchMode, debug};
use gsm_entities::phy::VirtualPhy;
use gsm_pdus::sacch::fields::l1_header::SacchL1Header;
use gsm_pdus::sacch::fields::meas_results::MeasResults;
use gsm_pdus::sacch::pdus::sacch_block::SacchBlock;
use gsm_saps::control::TsReleaseReq;
use gsm_saps::mph::MphParamChangeReq;
use gsm_saps::ph::PhSacchInd;
use gsm_saps::rsl::{RepAcchCap, RslChanActiv, RslRfChanRel, TopAcchCap};
use gsm_saps::sapmsg::{SapMsg, SapMsgInner};

use common::{ComponentTest, default_test_config};

const CHAN: ChanNr = ChanNr { trx: 0, ts: 2, ss: 0 };

fn from_bsc(msg: SapMsgInner) -> SapMsg {
    SapMsg::new(Sap::RslSap, BtsEntity::Abis, BtsEntity::L1sap, GsmTime::default(), msg)
}

fn activation(chan: ChanNr, pchan: Pchan, lchan_type: LchanType) -> RslChanActiv {
    RslChanActiv {
        chan,
        pchan,
        lchan_type,
        tch_mode: TchMode::SpeechV1,
        ms_power_lvl: 5,
        ms_power_max_lvl: None,
        bs_power_red_db: 4,
        bs_power_max_db: Some(20),
        ta: 0,
        rep_acch_cap: RepAcchCap::default(),
        top_acch_cap: TopAcchCap::default(),
    }
}

fn meas_rep(rxlev: u8) -> Vec<u8> {
    let l1 = SacchL1Header {
        ms_pwr: 5,
        fpc_epc: false,
        srr_sro: false,
        ta: 0,
    };
    let mr = MeasResults {
        ba_used: false,
        dtx_used: false,
        rxlev_full: rxlev,
        meas_valid: true,
        rxlev_sub: rxlev,
        rxqual_full: 0,
        rxqual_sub: 0,
    };
    SacchBlock::build_meas_rep(l1, &mr)
}

fn sacch(fn_num: u32, block: Option<Vec<u8>>) -> SapMsg {
    SapMsg::new(
        Sap::PhSap,
        BtsEntity::Phy,
        BtsEntity::L1sap,
        GsmTime::new(fn_num),
        SapMsgInner::PhSacchInd(PhSacchInd { chan: CHAN, fn_num, block }),
    )
}

/// L1sap talking to a real VirtualPhy, Abis and Oml replaced by sinks
fn setup() -> ComponentTest {
    debug::setup_logging_verbose();
    let mut cfg = default_test_config();
    cfg.power_ctrl.dl.target_dbm = -80;
    let mut test = ComponentTest::new(cfg, None);
    test.populate_entities(vec![BtsEntity::Phy, BtsEntity::L1sap], vec![BtsEntity::Abis, BtsEntity::Oml]);
    test.submit_message(from_bsc(SapMsgInner::RslChanActiv(activation(CHAN, Pchan::TchF, LchanType::TchF))));
    test.deliver_all_messages();
    test
}

#[test]
fn test_sacch_report_drives_phy() {
    let mut test = setup();
    let lower_step = test.get_shared_config().config().power_ctrl.dl.lower_step_max_db;

    // MS hears us at -50 dBm, 30 dB above target
    test.submit_message(sacch(142, Some(meas_rep(dbm2rxlev(-50)))));
    test.deliver_all_messages();

    let msgs = test.dump_sink(BtsEntity::Abis);
    assert_eq!(msgs.len(), 1);
    let SapMsgInner::RslMeasRes(res) = &msgs[0].msg else {
        panic!("expected measurement result, got {:?}", msgs[0].msg);
    };
    assert_eq!(res.chan, CHAN);
    assert_eq!(res.l1_info.map(|l1| l1.ms_pwr), Some(5));
    assert!(res.l3_info.is_some());
    // Reported with the attenuation that was in use during the period
    assert_eq!(res.bs_power_red_db, 4);

    let phy = test.entity_mut::<VirtualPhy>(BtsEntity::Phy);
    let expected = MphParamChangeReq {
        chan: CHAN,
        bs_power_red_db: 4 + lower_step,
        ms_power_lvl: 5,
        ta: 0,
        rep_facch: false,
        top_acch: false,
    };
    assert_eq!(phy.tx_params(CHAN), Some(&expected));

    // Nothing moved on the next block, the PHY keeps what it has
    let lchan_red = test.l1sap().lchan(CHAN).expect("channel active").bs_power_ctrl.current;
    assert_eq!(lchan_red, 4 + lower_step);
    test.submit_message(sacch(246, Some(meas_rep(dbm2rxlev(-80)))));
    test.deliver_all_messages();
    let msgs = test.dump_sink(BtsEntity::Abis);
    let SapMsgInner::RslMeasRes(res) = &msgs[0].msg else {
        panic!("expected measurement result, got {:?}", msgs[0].msg);
    };
    assert_eq!(res.res_nr, 1);
    let phy = test.entity_mut::<VirtualPhy>(BtsEntity::Phy);
    assert_eq!(phy.tx_params(CHAN), Some(&expected));
}

#[test]
fn test_lost_sacch_still_reports() {
    let mut test = setup();
    test.submit_message(sacch(142, None));
    test.submit_message(sacch(246, Some(vec![0u8; 5])));
    test.deliver_all_messages();

    let msgs = test.dump_sink(BtsEntity::Abis);
    let nrs: Vec<u8> = msgs
        .iter()
        .filter_map(|m| match &m.msg {
            SapMsgInner::RslMeasRes(res) if res.l1_info.is_none() => Some(res.res_nr),
            _ => None,
        })
        .collect();
    assert_eq!(nrs, vec![0, 1]);
    // No report from the MS, the loops stay put
    assert!(test.entity_mut::<VirtualPhy>(BtsEntity::Phy).tx_params(CHAN).is_none());
}

#[test]
fn test_release_deactivates_in_phy() {
    let mut test = setup();
    test.submit_message(sacch(142, Some(meas_rep(dbm2rxlev(-50)))));
    test.submit_message(from_bsc(SapMsgInner::RslRfChanRel(RslRfChanRel { chan: CHAN })));
    test.deliver_all_messages();

    assert_eq!(test.l1sap().num_active(), 0);
    let phy = test.entity_mut::<VirtualPhy>(BtsEntity::Phy);
    assert_eq!(phy.num_deactivated(), 1);
    assert!(phy.tx_params(CHAN).is_none());

    // SACCH after release is ignored
    test.dump_sinks();
    test.submit_message(sacch(246, None));
    test.deliver_all_messages();
    assert!(test.dump_sink(BtsEntity::Abis).is_empty());

    // Releasing twice does not reach the PHY again
    test.submit_message(from_bsc(SapMsgInner::RslRfChanRel(RslRfChanRel { chan: CHAN })));
    test.deliver_all_messages();
    assert_eq!(test.entity_mut::<VirtualPhy>(BtsEntity::Phy).num_deactivated(), 1);
}

#[test]
fn test_ts_release_frees_all_subslots() {
    let mut test = setup();
    for ss in 0..8 {
        let chan = ChanNr::new(0, 1, ss);
        test.submit_message(from_bsc(SapMsgInner::RslChanActiv(activation(chan, Pchan::Sdcch8, LchanType::Sdcch))));
    }
    test.deliver_all_messages();
    assert_eq!(test.l1sap().num_active(), 9);

    test.submit_message(SapMsg::new(
        Sap::Control,
        BtsEntity::Oml,
        BtsEntity::L1sap,
        GsmTime::default(),
        SapMsgInner::TsReleaseReq(TsReleaseReq { trx: 0, ts: 1 }),
    ));
    test.deliver_all_messages();

    assert_eq!(test.l1sap().num_active(), 1);
    assert!(test.l1sap().lchan(CHAN).is_some());
    assert_eq!(test.entity_mut::<VirtualPhy>(BtsEntity::Phy).num_deactivated(), 8);
}
