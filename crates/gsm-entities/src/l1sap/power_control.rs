//! Closed loop MS and BS power control (TS 45.008 section 4)
use gsm_config::{PowerCtrlParams, PowerFilter};
use gsm_core::GsmBand;
use gsm_core::band::{ms_pwr_ctl_lvl, ms_pwr_dbm, rxlev2dbm};
use gsm_pdus::sacch::fields::meas_results::MeasResults;

use crate::l1sap::lchan::Lchan;

/// Power control state of one direction of a logical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCtrlState {
    /// MS: power control level. BS: attenuation in dB.
    pub current: u8,
    /// MS: lowest level (highest power) allowed. BS: maximum attenuation.
    pub max: u8,
    /// Set when no dynamic control was granted
    pub fixed: bool,
    /// EWMA filter state, average in 1/100 dBm
    avg100: Option<i32>,
}

impl PowerCtrlState {
    pub fn new(current: u8, max: u8) -> Self {
        Self {
            current,
            max,
            fixed: false,
            avg100: None,
        }
    }

    pub fn fixed(current: u8) -> Self {
        Self {
            current,
            max: current,
            fixed: true,
            avg100: None,
        }
    }
}

/// EWMA with alpha in percent. The first sample seeds the average.
fn do_pf_ewma(alpha: u8, state: &mut PowerCtrlState, value: i32) -> i32 {
    let a = alpha as i32;
    let avg100 = match state.avg100 {
        None => value * 100,
        Some(avg100) => a * value + avg100 - a * avg100 / 100,
    };
    state.avg100 = Some(avg100);
    avg100 / 100
}

/// Signed adjustment in dB that brings `measured_dbm` closer to the target.
/// Positive means the receiving side wants more power.
pub fn calc_delta(params: &PowerCtrlParams, state: &mut PowerCtrlState, measured_dbm: i32) -> i32 {
    let value = match params.pf {
        PowerFilter::None => measured_dbm,
        PowerFilter::Ewma { alpha } => do_pf_ewma(alpha, state, measured_dbm),
    };

    let diff = params.target_dbm - value;
    if diff.abs() <= params.hysteresis_db as i32 {
        return 0;
    }
    diff.clamp(-(params.lower_step_max_db as i32), params.raise_step_max_db as i32)
}

impl Lchan {
    /// BS power loop, driven by the measurement report of the MS.
    /// Returns true if the attenuation changed.
    pub fn bs_pwr_ctrl(&mut self, params: &PowerCtrlParams, mr: Option<&MeasResults>) -> bool {
        let state = &mut self.bs_power_ctrl;
        if state.fixed {
            return false;
        }
        let Some(mr) = mr.filter(|mr| mr.is_valid()) else {
            return false;
        };

        // DL DTX leaves only the SUB blocks meaningful
        let (rxlev, rxqual) = if self.dl_dtx_active {
            (mr.rxlev_sub, mr.rxqual_sub)
        } else {
            (mr.rxlev_full, mr.rxqual_full)
        };

        let new = if rxqual > 0 {
            // Bit errors at the MS, halve the attenuation
            state.current / 2
        } else {
            let delta = calc_delta(params, state, rxlev2dbm(rxlev));
            (state.current as i32 - delta).clamp(0, state.max as i32) as u8
        };

        if new == state.current {
            tracing::trace!("{} keeping DL attenuation at {} dB (rxlev {}, rxqual {})", self.chan, new, rxlev, rxqual);
            return false;
        }
        tracing::debug!(
            "{} {} DL attenuation {} -> {} dB (rxlev {}, rxqual {})",
            self.chan,
            if new > state.current { "raising" } else { "lowering" },
            state.current,
            new,
            rxlev,
            rxqual
        );
        state.current = new;
        true
    }

    /// MS power loop, driven by the uplink RSSI the BTS measured while the MS
    /// transmitted at `ms_power_lvl`. Returns true if the level changed.
    pub fn ms_pwr_ctrl(&mut self, params: &PowerCtrlParams, band: GsmBand, ms_power_lvl: u8, ul_rssi_dbm: i32) -> bool {
        let state = &mut self.ms_power_ctrl;
        if state.fixed {
            return false;
        }

        let current_dbm = ms_pwr_dbm(band, ms_power_lvl);
        let new_dbm = (current_dbm + calc_delta(params, state, ul_rssi_dbm)).max(0);
        let mut new_lvl = ms_pwr_ctl_lvl(band, new_dbm);
        // Lower level numbers mean more power
        if new_lvl < state.max {
            new_lvl = state.max;
        }

        if new_lvl == state.current {
            tracing::trace!("{} keeping MS power at lvl {} (rssi {} dBm)", self.chan, new_lvl, ul_rssi_dbm);
            return false;
        }
        tracing::debug!(
            "{} MS power lvl {} -> {} ({} -> {} dBm, rssi {} dBm, target {} dBm)",
            self.chan,
            state.current,
            new_lvl,
            current_dbm,
            ms_pwr_dbm(band, new_lvl),
            ul_rssi_dbm,
            params.target_dbm
        );
        state.current = new_lvl;
        true
    }
}
