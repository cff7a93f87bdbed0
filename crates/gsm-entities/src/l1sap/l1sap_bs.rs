use std::collections::HashMap;

use gsm_config::SharedConfig;
use gsm_core::gsm_entities::BtsEntity;
use gsm_core::{ChanNr, GsmTime, Sap};
use gsm_saps::control::TsReleaseReq;
use gsm_saps::mph::MphDeactivateReq;
use gsm_saps::ph::{PhDtxDlInd, PhMeasInd, PhSacchInd};
use gsm_saps::rsl::{RslChanActiv, RslRfChanRel};
use gsm_saps::{SapMsg, SapMsgInner};

use crate::l1sap::lchan::Lchan;
use crate::l1sap::measurement::MeasError;
use crate::{BtsEntityTrait, MessageQueue};

/// Layer 1 service access point. Owns the active logical channels, feeds
/// their measurements and runs the control loops at the end of each SACCH period.
pub struct L1sap {
    config: SharedConfig,
    lchans: HashMap<ChanNr, Lchan>,
}

impl L1sap {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            config,
            lchans: HashMap::new(),
        }
    }

    pub fn lchan(&self, chan: ChanNr) -> Option<&Lchan> {
        self.lchans.get(&chan)
    }

    pub fn lchan_mut(&mut self, chan: ChanNr) -> Option<&mut Lchan> {
        self.lchans.get_mut(&chan)
    }

    pub fn num_active(&self) -> usize {
        self.lchans.len()
    }

    fn send_deactivate(queue: &mut MessageQueue, dltime: GsmTime, chan: ChanNr) {
        queue.push_back(SapMsg::new(
            Sap::MphSap,
            BtsEntity::L1sap,
            BtsEntity::Phy,
            dltime,
            SapMsgInner::MphDeactivateReq(MphDeactivateReq { chan }),
        ));
    }

    fn rx_chan_activ(&mut self, act: RslChanActiv) {
        tracing::info!("<- RslChanActiv {} {:?} {:?} {:?}", act.chan, act.pchan, act.lchan_type, act.tch_mode);
        let mut lchan = Lchan::from_activation(&act);
        lchan.meas_reset();
        if self.lchans.insert(act.chan, lchan).is_some() {
            tracing::warn!("{} activated while already active, state reset", act.chan);
        }
    }

    fn rx_rf_chan_rel(&mut self, queue: &mut MessageQueue, dltime: GsmTime, rel: RslRfChanRel) {
        tracing::info!("<- RslRfChanRel {}", rel.chan);
        if self.lchans.remove(&rel.chan).is_none() {
            tracing::warn!("{} released but not active", rel.chan);
            return;
        }
        Self::send_deactivate(queue, dltime, rel.chan);
    }

    fn rx_ts_release(&mut self, queue: &mut MessageQueue, dltime: GsmTime, req: TsReleaseReq) {
        let mut chans: Vec<ChanNr> = self
            .lchans
            .keys()
            .filter(|c| c.trx == req.trx && c.ts == req.ts)
            .copied()
            .collect();
        chans.sort_by_key(|c| c.ss);
        tracing::info!("<- TsReleaseReq trx={} ts={}, releasing {} lchans", req.trx, req.ts, chans.len());
        for chan in chans {
            self.lchans.remove(&chan);
            Self::send_deactivate(queue, dltime, chan);
        }
    }

    /// Feeds one uplink sample. Returns whether a period was completed.
    pub fn rx_ph_meas_ind(&mut self, ind: &PhMeasInd) -> Result<bool, MeasError> {
        let Some(lchan) = self.lchans.get_mut(&ind.chan) else {
            tracing::info!(ts = ind.fn_num, "{} measurement during inactive state", ind.chan);
            return Err(MeasError::ChannelNotActive);
        };
        Ok(lchan.process_measurement(&ind.sample, ind.fn_num))
    }

    fn rx_ph_sacch_ind(&mut self, queue: &mut MessageQueue, dltime: GsmTime, ind: PhSacchInd) {
        let cfg = self.config.config();
        let Some(lchan) = self.lchans.get_mut(&ind.chan) else {
            tracing::info!(ts = ind.fn_num, "{} SACCH block on inactive lchan", ind.chan);
            return;
        };

        let outcome = lchan.handle_sacch(&cfg, ind.block.as_deref());
        queue.push_back(SapMsg::new(
            Sap::RslSap,
            BtsEntity::L1sap,
            BtsEntity::Abis,
            dltime,
            SapMsgInner::RslMeasRes(outcome.meas_res),
        ));
        if let Some(change) = outcome.param_change {
            tracing::debug!("-> MphParamChangeReq {:?}", change);
            queue.push_back(SapMsg::new(
                Sap::MphSap,
                BtsEntity::L1sap,
                BtsEntity::Phy,
                dltime,
                SapMsgInner::MphParamChangeReq(change),
            ));
        }
    }

    fn rx_ph_dtx_dl_ind(&mut self, ind: PhDtxDlInd) {
        match self.lchans.get_mut(&ind.chan) {
            Some(lchan) => lchan.dl_dtx_active = true,
            None => tracing::debug!("{} DL DTX on inactive lchan", ind.chan),
        }
    }
}

impl BtsEntityTrait for L1sap {
    fn entity(&self) -> BtsEntity {
        BtsEntity::L1sap
    }

    fn set_config(&mut self, config: SharedConfig) {
        self.config = config;
    }

    fn rx_prim(&mut self, queue: &mut MessageQueue, message: SapMsg) {
        tracing::trace!("rx_prim: {:?}", message);
        let dltime = message.dltime;

        match message.msg {
            SapMsgInner::PhMeasInd(ind) => {
                if let Err(e) = self.rx_ph_meas_ind(&ind) {
                    tracing::debug!("{} sample not recorded: {}", ind.chan, e);
                }
            }
            SapMsgInner::PhSacchInd(ind) => self.rx_ph_sacch_ind(queue, dltime, ind),
            SapMsgInner::PhDtxDlInd(ind) => self.rx_ph_dtx_dl_ind(ind),
            SapMsgInner::RslChanActiv(act) => self.rx_chan_activ(act),
            SapMsgInner::RslRfChanRel(rel) => self.rx_rf_chan_rel(queue, dltime, rel),
            SapMsgInner::TsReleaseReq(req) => self.rx_ts_release(queue, dltime, req),
            other => {
                tracing::warn!("L1sap: unexpected primitive {}", other);
            }
        }
    }
}
