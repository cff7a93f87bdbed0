//! PHY without a radio. Provides the frame clock and acknowledges
//! transceiver bring-up so the NM tree can come up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use gsm_config::SharedConfig;
use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{ChanNr, GsmTime, Sap};
use gsm_saps::control::LinkControl;
use gsm_saps::mph::MphParamChangeReq;
use gsm_saps::{SapMsg, SapMsgInner};

use crate::{BtsEntityTrait, MessageQueue};

/// One TDMA frame, 120 ms / 26
pub const TDMA_FRAME_DURATION: Duration = Duration::from_nanos(4_615_385);

pub struct VirtualPhy {
    config: SharedConfig,
    /// Sleep to keep ticks aligned to the TDMA frame clock
    paced: bool,
    next_deadline: Option<Instant>,
    links_reported: bool,
    /// Last transmit parameters per channel
    tx_params: HashMap<ChanNr, MphParamChangeReq>,
    num_deactivated: usize,
}

impl VirtualPhy {
    pub fn new(config: SharedConfig, paced: bool) -> Self {
        Self {
            config,
            paced,
            next_deadline: None,
            links_reported: false,
            tx_params: HashMap::new(),
            num_deactivated: 0,
        }
    }

    pub fn tx_params(&self, chan: ChanNr) -> Option<&MphParamChangeReq> {
        self.tx_params.get(&chan)
    }

    pub fn num_deactivated(&self) -> usize {
        self.num_deactivated
    }

    fn pace(&mut self) {
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        } else if now - deadline > TDMA_FRAME_DURATION * 26 {
            tracing::warn!("VirtualPhy: running {:?} late, resyncing clock", now - deadline);
            self.next_deadline = Some(now + TDMA_FRAME_DURATION);
            return;
        }
        self.next_deadline = Some(deadline + TDMA_FRAME_DURATION);
    }
}

impl BtsEntityTrait for VirtualPhy {
    fn entity(&self) -> BtsEntity {
        BtsEntity::Phy
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn tick_start(&mut self, queue: &mut MessageQueue, ts: GsmTime) {
        if self.paced {
            self.pace();
        }
        if !self.links_reported {
            self.links_reported = true;
            let num_trx = self.config.config().bts.num_trx;
            tracing::info!(ts = ts.fn_num, "VirtualPhy: {} transceivers ready", num_trx);
            for trx in 0..num_trx {
                queue.push_back(SapMsg::new(
                    Sap::Control,
                    BtsEntity::Phy,
                    BtsEntity::Oml,
                    ts,
                    SapMsgInner::LinkControl(LinkControl::PhyLinkUp { trx }),
                ));
            }
        }
    }

    fn rx_prim(&mut self, _queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?}", message);
        match message.msg {
            SapMsgInner::MphParamChangeReq(req) => {
                tracing::debug!(
                    "<- MphParamChangeReq {} bs_red={}dB ms_lvl={} ta={} rep_facch={} top_acch={}",
                    req.chan,
                    req.bs_power_red_db,
                    req.ms_power_lvl,
                    req.ta,
                    req.rep_facch,
                    req.top_acch
                );
                self.tx_params.insert(req.chan, req);
            }
            SapMsgInner::MphDeactivateReq(req) => {
                tracing::debug!("<- MphDeactivateReq {}", req.chan);
                self.tx_params.remove(&req.chan);
                self.num_deactivated += 1;
            }
            other => {
                tracing::warn!("VirtualPhy: unexpected primitive {}", other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gsm_config::{PhyBackend, StackConfig};

    use super::*;

    fn config(num_trx: u8) -> SharedConfig {
        let mut cfg = StackConfig::new(vec!["127.0.0.1".to_string()]);
        cfg.phy_io.backend = PhyBackend::Virtual;
        cfg.bts.num_trx = num_trx;
        SharedConfig::from_config(cfg)
    }

    #[test]
    fn test_links_reported_once() {
        let mut phy = VirtualPhy::new(config(2), false);
        let mut queue = MessageQueue::new();

        phy.tick_start(&mut queue, GsmTime::new(0));
        assert_eq!(queue.len(), 2);
        phy.tick_start(&mut queue, GsmTime::new(1));
        assert_eq!(queue.len(), 2);

        let first = queue.pop_front().unwrap();
        assert!(matches!(first.msg, SapMsgInner::LinkControl(LinkControl::PhyLinkUp { trx: 0 })));
        assert_eq!(first.dest, BtsEntity::Oml);
    }

    #[test]
    fn test_pacing() {
        let mut phy = VirtualPhy::new(config(1), true);
        let start = Instant::now();
        for _ in 0..5 {
            phy.pace();
        }
        // First frame is immediate, then four frame durations
        assert!(start.elapsed() >= TDMA_FRAME_DURATION * 4);
    }
}
