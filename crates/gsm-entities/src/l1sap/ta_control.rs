//! Timing advance loop (TS 45.010 section 5.6)
use crate::l1sap::lchan::Lchan;

/// 90% of one symbol in 1/256 bit units
pub const TOA256_9OPERCENT: i16 = 230;

/// Largest timing advance (TS 45.010)
pub const TA_MAX: u8 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaCtrlState {
    pub current: u8,
    /// SACCH blocks left to skip before the next adjustment
    pub skip_block_num: u8,
}

impl Lchan {
    /// Adjusts the timing advance by at most one step per run. Returns true if it changed.
    pub fn ms_ta_ctrl(&mut self, interval: u8, ms_tx_ta: u8, toa256: i16) -> bool {
        let state = &mut self.ta_ctrl;
        if state.skip_block_num > 0 {
            state.skip_block_num -= 1;
            return false;
        }
        state.skip_block_num = interval;

        let old = state.current;
        if toa256 < -TOA256_9OPERCENT && state.current > 0 {
            state.current -= 1;
        } else if toa256 > TOA256_9OPERCENT && state.current < TA_MAX {
            state.current += 1;
        }

        if state.current == old {
            return false;
        }
        tracing::debug!(
            "{} TA {} -> {} (MS uses {}, toa256 {})",
            self.chan,
            old,
            state.current,
            ms_tx_ta,
            toa256
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use gsm_core::{ChanNr, LchanType, Pchan, TchMode};

    use super::*;

    fn lchan(ta: u8) -> Lchan {
        let mut l = Lchan::new(ChanNr::new(0, 3, 0), Pchan::TchF, LchanType::TchF, TchMode::SpeechV1);
        l.ta_ctrl.current = ta;
        l
    }

    #[test]
    fn test_ta_steps() {
        let mut l = lchan(5);
        assert!(l.ms_ta_ctrl(0, 5, 300));
        assert_eq!(l.ta_ctrl.current, 6);
        assert!(l.ms_ta_ctrl(0, 6, -231));
        assert!(l.ms_ta_ctrl(0, 5, -300));
        assert_eq!(l.ta_ctrl.current, 4);
        // Within 90% of a symbol
        assert!(!l.ms_ta_ctrl(0, 4, 230));
        assert!(!l.ms_ta_ctrl(0, 4, -230));
        assert_eq!(l.ta_ctrl.current, 4);
    }

    #[test]
    fn test_ta_limits() {
        let mut l = lchan(0);
        assert!(!l.ms_ta_ctrl(0, 0, -1000));
        assert_eq!(l.ta_ctrl.current, 0);

        let mut l = lchan(TA_MAX);
        assert!(!l.ms_ta_ctrl(0, TA_MAX, 1000));
        assert_eq!(l.ta_ctrl.current, TA_MAX);
    }

    #[test]
    fn test_ta_interval_skips_blocks() {
        let mut l = lchan(10);
        assert!(l.ms_ta_ctrl(2, 10, 500));
        // Two blocks skipped
        assert!(!l.ms_ta_ctrl(2, 11, 500));
        assert!(!l.ms_ta_ctrl(2, 11, 500));
        assert_eq!(l.ta_ctrl.current, 11);
        assert!(l.ms_ta_ctrl(2, 11, 500));
        assert_eq!(l.ta_ctrl.current, 12);
    }
}
