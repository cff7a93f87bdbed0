use gsm_config::StackConfig;
use gsm_core::band::rxlev2dbm;
use gsm_pdus::sacch::pdus::sacch_block::SacchBlock;
use gsm_saps::mph::MphParamChangeReq;
use gsm_saps::rsl::RslMeasRes;

use crate::l1sap::lchan::Lchan;

/// What the end of a SACCH period produces: the report for the BSC and,
/// if any control loop moved, new transmit parameters for the PHY
#[derive(Debug)]
pub struct SacchOutcome {
    pub meas_res: RslMeasRes,
    pub param_change: Option<MphParamChangeReq>,
}

impl Lchan {
    /// Handles one uplink SACCH block. `data` is None when the block was lost,
    /// a block of the wrong size counts as lost.
    pub fn handle_sacch(&mut self, cfg: &StackConfig, data: Option<&[u8]>) -> SacchOutcome {
        let before = self.tx_params();

        let block = data.and_then(|d| match SacchBlock::from_bytes(d) {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::debug!("{} unusable SACCH block: {}", self.chan, e);
                None
            }
        });

        // The L1 header carries power and TA the MS used during the last period
        let (ms_pwr, ms_ta) = match &block {
            Some(block) => {
                self.meas.l1_info = block.l1;
                self.meas.l1_valid = true;
                (block.l1.ms_pwr, block.l1.ta)
            }
            None => {
                self.meas.l1_valid = false;
                (self.ms_power_ctrl.current, self.ta_ctrl.current)
            }
        };

        let meas_res = RslMeasRes {
            chan: self.chan,
            res_nr: self.meas.res_nr,
            ul: self.meas.ul_res,
            bs_power_red_db: self.bs_power_ctrl.current,
            l1_info: self.meas.l1_valid.then_some(self.meas.l1_info),
            l3_info: block.as_ref().and_then(|b| b.l3()).map(|l3| l3.to_vec()),
            timing_offset: self.timing_offset(ms_ta),
            ext: self.meas.ext_valid.then_some(self.meas.ext),
        };
        self.meas.res_nr = self.meas.res_nr.wrapping_add(1);
        tracing::debug!(
            "{} -> RslMeasRes nr={} ul={:?} l3={}",
            self.chan,
            meas_res.res_nr,
            meas_res.ul,
            meas_res.l3_info.is_some()
        );

        // Only a MEAS REP carries results, EXT MEAS REP does not
        let mr = block.as_ref().and_then(|b| b.meas_res()).copied();
        let valid_mr = mr.filter(|mr| mr.is_valid());

        // Without a valid report assume the MS used DTX
        let dtxu_used = valid_mr.map(|mr| mr.dtx_used).unwrap_or(true);
        let ul_rssi = if dtxu_used {
            rxlev2dbm(self.meas.ul_res.sub.rx_lev)
        } else {
            rxlev2dbm(self.meas.ul_res.full.rx_lev)
        };

        self.ms_ta_ctrl(cfg.ta_ctrl.interval, ms_ta, self.meas.ms_toa256);
        self.ms_pwr_ctrl(&cfg.power_ctrl.ul, cfg.bts.band, ms_pwr, ul_rssi);
        if let Some(mr) = valid_mr.as_ref() {
            self.bs_pwr_ctrl(&cfg.power_ctrl.dl, Some(mr));
            self.acch_overpower_active_decision(mr);
        }
        self.repeated_dl_facch_active_decision(mr.as_ref());

        // Next period starts clean
        self.dl_dtx_active = false;
        self.meas.ext_valid = false;
        self.ms_t_offs = None;
        self.p_offs = None;

        let after = self.tx_params();
        let param_change = (after != before).then(|| MphParamChangeReq {
            chan: self.chan,
            bs_power_red_db: after.bs_power_red_db,
            ms_power_lvl: after.ms_power_lvl,
            ta: after.ta,
            rep_facch: after.rep_facch,
            top_acch: after.top_acch,
        });

        SacchOutcome { meas_res, param_change }
    }
}
