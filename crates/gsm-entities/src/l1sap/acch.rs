//! Repeated FACCH and temporary ACCH overpower decisions (TS 44.006, TS 45.008)
use gsm_pdus::sacch::fields::meas_results::MeasResults;

use crate::l1sap::lchan::Lchan;

/// Threshold with hysteresis on an RXQUAL value. Returns the new decision,
/// keeping `prev` inside the band between the thresholds.
fn rxqual_hysteresis(prev: bool, threshold: u8, rxqual: u8) -> bool {
    let upper = threshold;
    let lower = threshold.saturating_sub(2);
    if rxqual >= upper {
        true
    } else if rxqual <= lower {
        false
    } else {
        prev
    }
}

/// RXQUAL as seen by the MS, SUB when it applied DTX
fn dl_rxqual(mr: &MeasResults) -> u8 {
    if mr.dtx_used { mr.rxqual_sub } else { mr.rxqual_full }
}

impl Lchan {
    /// Decides whether downlink FACCH blocks are repeated
    pub fn repeated_dl_facch_active_decision(&mut self, mr: Option<&MeasResults>) {
        let prev = self.dl_facch_active;
        let cap = self.rep_acch_cap;

        self.dl_facch_active = if !cap.dl_facch_cmd && !cap.dl_facch_all {
            false
        } else if cap.rxqual == 0 {
            true
        } else if self.meas.l1_info.srr_sro {
            // MS asked for repeated SACCH, repeat FACCH too
            true
        } else {
            match mr.filter(|mr| mr.is_valid()) {
                Some(mr) => rxqual_hysteresis(prev, cap.rxqual, dl_rxqual(mr)),
                None => prev,
            }
        };

        if self.dl_facch_active != prev {
            tracing::debug!(
                "{} DL-FACCH repetition: {}",
                self.chan,
                if self.dl_facch_active { "inactive => active" } else { "active => inactive" }
            );
        }
    }

    /// Decides whether ACCH blocks are sent with overpower. Only called with a valid report.
    pub fn acch_overpower_active_decision(&mut self, mr: &MeasResults) {
        let cap = self.top_acch_cap;
        if cap.overpower_db == 0 || cap.rxqual == 0 {
            return;
        }

        let prev = self.top_acch_active;
        self.top_acch_active = rxqual_hysteresis(prev, cap.rxqual, dl_rxqual(mr));
        if self.top_acch_active != prev {
            tracing::debug!(
                "{} temporary ACCH overpower: {}",
                self.chan,
                if self.top_acch_active { "inactive => active" } else { "active => inactive" }
            );
        }
    }
}
