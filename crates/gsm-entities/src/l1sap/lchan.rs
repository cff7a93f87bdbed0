use gsm_core::{ChanNr, LchanType, Pchan, TchMode};
use gsm_pdus::sacch::fields::l1_header::SacchL1Header;
use gsm_saps::ph::UlMeasSample;
use gsm_saps::rsl::{ExtMeasStats, RepAcchCap, RslChanActiv, TopAcchCap, UlMeasRes};

use crate::l1sap::power_control::PowerCtrlState;
use crate::l1sap::ta_control::TaCtrlState;

/// Longest measurement period (TCH/F, 104 frames) bounds the sample buffer
pub const MEAS_BUF_LEN: usize = 104;

/// Uplink measurement state of one logical channel
#[derive(Debug, Clone)]
pub struct LchanMeas {
    /// Samples of the running period, oldest first
    pub(crate) uplink: Vec<UlMeasSample>,
    /// Frame number of the last recorded sample
    pub last_fn: Option<u32>,
    /// Result of the last completed period
    pub ul_res: UlMeasRes,
    pub res_valid: bool,
    pub ext_valid: bool,
    pub l1_valid: bool,
    /// Mean timing offset of the last completed period, 1/256 bit
    pub ms_toa256: i16,
    pub ul_ci_cb_full: i16,
    pub ul_ci_cb_sub: i16,
    pub ext: ExtMeasStats,
    /// L1 header of the last received SACCH block
    pub l1_info: SacchL1Header,
    /// Measurement result number, wraps at 256
    pub res_nr: u8,
    /// Frame number at which the last period was computed
    pub(crate) last_computed_fn: Option<u32>,
}

impl Default for LchanMeas {
    fn default() -> Self {
        Self {
            uplink: Vec::with_capacity(MEAS_BUF_LEN),
            last_fn: None,
            ul_res: UlMeasRes::default(),
            res_valid: false,
            ext_valid: false,
            l1_valid: false,
            ms_toa256: 0,
            ul_ci_cb_full: 0,
            ul_ci_cb_sub: 0,
            ext: ExtMeasStats::default(),
            l1_info: SacchL1Header::default(),
            res_nr: 0,
            last_computed_fn: None,
        }
    }
}

impl LchanMeas {
    pub fn num_ul_meas(&self) -> usize {
        self.uplink.len()
    }
}

/// Transmit parameters the PHY has to know about. Compared before and after
/// the control loops ran to decide whether an update is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub bs_power_red_db: u8,
    pub ms_power_lvl: u8,
    pub ta: u8,
    pub rep_facch: bool,
    pub top_acch: bool,
}

/// An active logical channel
#[derive(Debug, Clone)]
pub struct Lchan {
    pub chan: ChanNr,
    pub pchan: Pchan,
    pub lchan_type: LchanType,
    pub tch_mode: TchMode,

    pub meas: LchanMeas,

    /// MS power control, `current`/`max` are power control levels
    pub ms_power_ctrl: PowerCtrlState,
    /// BS power control, `current`/`max` are attenuation in dB
    pub bs_power_ctrl: PowerCtrlState,
    pub ta_ctrl: TaCtrlState,

    pub rep_acch_cap: RepAcchCap,
    pub dl_facch_active: bool,
    pub top_acch_cap: TopAcchCap,
    pub top_acch_active: bool,

    /// Downlink DTX was applied during the current period
    pub dl_dtx_active: bool,
    /// MS timing offset, 1/4 symbol, when known from the access burst
    pub ms_t_offs: Option<i32>,
    /// Propagation offset, when known from handover
    pub p_offs: Option<i32>,
}

impl Lchan {
    pub fn new(chan: ChanNr, pchan: Pchan, lchan_type: LchanType, tch_mode: TchMode) -> Self {
        Self {
            chan,
            pchan,
            lchan_type,
            tch_mode,
            meas: LchanMeas::default(),
            ms_power_ctrl: PowerCtrlState::fixed(0),
            bs_power_ctrl: PowerCtrlState::fixed(0),
            ta_ctrl: TaCtrlState::default(),
            rep_acch_cap: RepAcchCap::default(),
            dl_facch_active: false,
            top_acch_cap: TopAcchCap::default(),
            top_acch_active: false,
            dl_dtx_active: false,
            ms_t_offs: None,
            p_offs: None,
        }
    }

    /// Builds the channel from an RSL CHANNEL ACTIVATION. A missing maximum
    /// puts the corresponding power loop in fixed mode.
    pub fn from_activation(act: &RslChanActiv) -> Self {
        let mut lchan = Self::new(act.chan, act.pchan, act.lchan_type, act.tch_mode);
        lchan.ms_power_ctrl = match act.ms_power_max_lvl {
            Some(max) => PowerCtrlState::new(act.ms_power_lvl, max),
            None => PowerCtrlState::fixed(act.ms_power_lvl),
        };
        lchan.bs_power_ctrl = match act.bs_power_max_db {
            Some(max) => PowerCtrlState::new(act.bs_power_red_db, max),
            None => PowerCtrlState::fixed(act.bs_power_red_db),
        };
        lchan.ta_ctrl.current = act.ta.min(63);
        lchan.rep_acch_cap = act.rep_acch_cap;
        lchan.top_acch_cap = act.top_acch_cap;
        // A zero threshold means overpower is always on
        lchan.top_acch_active = act.top_acch_cap.overpower_db > 0 && act.top_acch_cap.rxqual == 0;
        lchan
    }

    pub fn is_amr(&self) -> bool {
        self.tch_mode == TchMode::SpeechAmr
    }

    /// Timing offsets learned outside the measurement path (access burst, handover)
    pub fn set_timing_offsets(&mut self, ms_t_offs: Option<i32>, p_offs: Option<i32>) {
        self.ms_t_offs = ms_t_offs;
        self.p_offs = p_offs;
    }

    /// MS timing offset for the measurement result, if known
    pub fn timing_offset(&self, ms_ta: u8) -> Option<i32> {
        match (self.ms_t_offs, self.p_offs) {
            (Some(t), _) if t >= 0 => Some(t),
            (_, Some(p)) if p >= 0 => Some(p - ms_ta as i32),
            _ => None,
        }
    }

    pub fn tx_params(&self) -> TxParams {
        TxParams {
            bs_power_red_db: self.bs_power_ctrl.current,
            ms_power_lvl: self.ms_power_ctrl.current,
            ta: self.ta_ctrl.current,
            rep_facch: self.dl_facch_active,
            top_acch: self.top_acch_active,
        }
    }
}
