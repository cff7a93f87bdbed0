//! Uplink measurement aggregation over SACCH reporting periods (TS 45.008 section 8)
use core::fmt;

use gsm_core::band::dbm2rxlev;
use gsm_core::{LchanType, Pchan, TchMode};
use gsm_saps::ph::UlMeasSample;
use gsm_saps::rsl::ExtMeasStats;

use crate::l1sap::lchan::{Lchan, LchanMeas, MEAS_BUF_LEN};

/// BER of a substituted sample, 100%
pub const MEAS_DUMMY_BER: u16 = 10000;
/// RSSI of a substituted sample, noise floor in -dBm
pub const MEAS_DUMMY_IRSSI: u32 = 109;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasError {
    /// The period already holds the maximum number of samples
    BufferFull,
    /// No active logical channel at this address
    ChannelNotActive,
}

impl fmt::Display for MeasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasError::BufferFull => write!(f, "no space for uplink measurement"),
            MeasError::ChannelNotActive => write!(f, "logical channel not active"),
        }
    }
}

impl std::error::Error for MeasError {}

// ─── Period boundaries ───

/// TCH/H speech frames carrying the SUB blocks, sub-channel 0 {0, 52}, sub-channel 1 {14, 66}
const TCHH_DTX_SUB_FN104: [u32; 4] = [0, 52, 14, 66];

/// Last SACCH block of the reporting period, indexed by timeslot
const TCHF_MEAS_REP_FN104_BY_TS: [u32; 8] = [90, 103, 12, 25, 38, 51, 64, 77];
const TCHH0_MEAS_REP_FN104_BY_TS: [u32; 8] = [90, 90, 12, 12, 38, 38, 64, 64];
const TCHH1_MEAS_REP_FN104_BY_TS: [u32; 8] = [103, 103, 25, 25, 51, 51, 77, 77];

/// First burst of the block completing the period, indexed by sub-channel
const SDCCH8_MEAS_REP_FN102_BY_SS: [u32; 8] = [66, 70, 74, 78, 98, 0, 4, 8];
const SDCCH4_MEAS_REP_FN102_BY_SS: [u32; 4] = [88, 92, 6, 10];

/// The SACCH block reporting a period arrives one block after the period ended.
/// Maps the frame the report is seen on to the frame listed in the tables.
fn translate_tch_meas_rep_fn104(fn_mod: u32) -> u32 {
    match fn_mod {
        25 => 103,
        38 => 12,
        51 => 25,
        64 => 38,
        77 => 51,
        90 => 64,
        103 => 77,
        12 => 90,
        _ => 0,
    }
}

/// Eight RXQUAL classes by BER in 0.01% steps (TS 45.008 section 8.2.4)
pub fn ber10k_to_rxqual(ber10k: u32) -> u8 {
    match ber10k {
        0..20 => 0,
        20..40 => 1,
        40..80 => 2,
        80..160 => 3,
        160..320 => 4,
        320..640 => 5,
        640..1280 => 6,
        _ => 7,
    }
}

impl Lchan {
    /// Length of the measurement period in frames, 1 for channels without one
    pub fn meas_modulus(&self) -> u32 {
        self.pchan.meas_period_len().unwrap_or(1)
    }

    /// Whether a sample taken on frame `fn_num` belongs to the SUB set (TS 45.008 section 8.3)
    pub fn is_sub(&self, fn_num: u32) -> bool {
        let fn104 = fn_num % 104;

        // AMR SID frames are scheduled dynamically, the PHY marks them
        if self.is_amr() {
            return false;
        }

        match self.lchan_type {
            LchanType::TchF => match self.tch_mode {
                TchMode::SpeechV1 | TchMode::SpeechEfr => fn104 == 52,
                TchMode::Signalling => true,
                _ => false,
            },
            LchanType::TchH => match self.tch_mode {
                TchMode::SpeechV1 => TCHH_DTX_SUB_FN104.contains(&fn104),
                TchMode::Signalling => true,
                _ => false,
            },
            LchanType::Sdcch => true,
        }
    }

    /// True exactly once per period, on the frame the period's report is due
    pub fn is_period_complete(&self, fn_num: u32) -> bool {
        let ts = self.chan.ts as usize;
        let ss = self.chan.ss as usize;

        let (fn_mod, expect) = match self.pchan {
            Pchan::TchF => (
                translate_tch_meas_rep_fn104(fn_num % 104),
                TCHF_MEAS_REP_FN104_BY_TS.get(ts),
            ),
            Pchan::TchH => {
                let tbl = if ss == 0 {
                    &TCHH0_MEAS_REP_FN104_BY_TS
                } else {
                    &TCHH1_MEAS_REP_FN104_BY_TS
                };
                (translate_tch_meas_rep_fn104(fn_num % 104), tbl.get(ts))
            }
            Pchan::Sdcch8 | Pchan::Sdcch8Cbch => (fn_num % 102, SDCCH8_MEAS_REP_FN102_BY_SS.get(ss)),
            Pchan::CcchSdcch4 | Pchan::CcchSdcch4Cbch => (fn_num % 102, SDCCH4_MEAS_REP_FN102_BY_SS.get(ss)),
            _ => return false,
        };

        let complete = expect == Some(&fn_mod);
        if complete {
            tracing::debug!(ts = fn_num, "{} meas period end fn_mod:{} pchan:{:?}", self.chan, fn_mod, self.pchan);
        }
        complete
    }

    /// Samples expected in one period
    fn num_meas_expected(&self) -> usize {
        match self.pchan {
            // 24 TCH blocks + 1 SACCH
            Pchan::TchF => 25,
            Pchan::TchH if self.tch_mode == TchMode::Signalling => 13,
            Pchan::TchH => 25,
            // 2 SDCCH + 1 SACCH
            Pchan::Sdcch8 | Pchan::Sdcch8Cbch | Pchan::CcchSdcch4 | Pchan::CcchSdcch4Cbch => 3,
            _ => self.meas.uplink.len(),
        }
    }

    /// SUB samples expected in one period. AMR negotiates its DTX periods
    /// dynamically, only the SACCH block is known to be SUB.
    fn num_meas_sub_expected(&self) -> usize {
        if self.is_amr() {
            return 1;
        }
        match self.pchan {
            Pchan::TchF if self.tch_mode == TchMode::Signalling => 25,
            Pchan::TchF => 2,
            Pchan::TchH if self.tch_mode == TchMode::Signalling => 13,
            Pchan::TchH => 3,
            Pchan::Sdcch8 | Pchan::Sdcch8Cbch | Pchan::CcchSdcch4 | Pchan::CcchSdcch4Cbch => 3,
            _ => 0,
        }
    }

    /// Appends one uplink sample to the running period
    pub fn record_sample(&mut self, sample: &UlMeasSample, fn_num: u32) -> Result<(), MeasError> {
        let fn_mod = fn_num % self.meas_modulus();

        if self.meas.uplink.len() >= MEAS_BUF_LEN {
            tracing::info!(
                ts = fn_num,
                "{} no space for uplink measurement, num_ul_meas={}, fn_mod={}",
                self.chan,
                self.meas.uplink.len(),
                fn_mod
            );
            return Err(MeasError::BufferFull);
        }

        let mut sample = *sample;
        // The PHY already marks AMR SID_UPDATE frames
        if !sample.is_sub {
            sample.is_sub = self.is_sub(fn_num);
        }
        self.meas.uplink.push(sample);
        self.meas.last_fn = Some(fn_num);

        tracing::trace!(
            ts = fn_num,
            "{} adding a {} measurement (ber10k={}, ta_offs={}, ci_cB={}, rssi=-{}), num_ul_meas={}, fn_mod={}",
            self.chan,
            if sample.is_sub { "SUB" } else { "FULL" },
            sample.ber10k,
            sample.ta_offs_256bits,
            sample.ci_cb,
            sample.inv_rssi,
            self.meas.uplink.len(),
            fn_mod
        );
        Ok(())
    }

    /// Computes the period result if `fn_num` ends a period. Returns true when
    /// a new result was stored and the next period started.
    pub fn compute_period(&mut self, fn_num: u32) -> bool {
        if !self.is_period_complete(fn_num) {
            return false;
        }
        if self.meas.last_computed_fn == Some(fn_num) {
            tracing::debug!(ts = fn_num, "{} period already computed", self.chan);
            return false;
        }

        let amr = self.is_amr();
        let num_expect = self.num_meas_expected();
        let num_sub_expect = self.num_meas_sub_expected();
        let num_stored = self.meas.uplink.len();
        // Keep the most recent samples
        let excess = num_stored.saturating_sub(num_expect);
        if excess > 0 {
            tracing::debug!("{} received {} excess UL measurements", self.chan, excess);
        }

        let mut ber_full_sum: u32 = 0;
        let mut irssi_full_sum: u32 = 0;
        let mut ci_full_sum: i32 = 0;
        let mut ber_sub_sum: u32 = 0;
        let mut irssi_sub_sum: u32 = 0;
        let mut ci_sub_sum: i32 = 0;
        let mut ta256_sum: i32 = 0;
        let mut num_meas_sub: usize = 0;
        let mut num_meas_sub_actual: usize = 0;
        let mut num_meas_sub_subst: usize = 0;
        let mut num_ul_meas_actual: usize = 0;
        let mut num_ul_meas_subst: usize = 0;

        let real = &self.meas.uplink[excess..];
        for i in 0..num_expect {
            // Missing samples are lost blocks, they count as 100% BER. RSSI,
            // C/I and TOA are only averaged over what was received.
            let (m, is_sub) = match real.get(i) {
                Some(m) => {
                    if m.is_sub {
                        irssi_sub_sum += m.inv_rssi as u32;
                        ci_sub_sum += m.ci_cb as i32;
                        num_meas_sub_actual += 1;
                    }
                    irssi_full_sum += m.inv_rssi as u32;
                    ta256_sum += m.ta_offs_256bits as i32;
                    ci_full_sum += m.ci_cb as i32;
                    num_ul_meas_actual += 1;
                    (m, m.is_sub)
                }
                None => {
                    let promote = !amr && num_meas_sub < num_sub_expect;
                    if promote {
                        num_meas_sub_subst += 1;
                    }
                    num_ul_meas_subst += 1;
                    (&UlMeasSample::DUMMY, promote)
                }
            };

            ber_full_sum += m.ber10k as u32;
            if is_sub {
                num_meas_sub += 1;
                ber_sub_sum += m.ber10k as u32;
            }
        }

        tracing::debug!(
            "{} received {} UL measurements ({} SUB), expected {} ({}{} SUB), substituted {} ({} SUB)",
            self.chan,
            num_stored,
            num_meas_sub_actual,
            num_expect,
            if amr { ">=" } else { "" },
            num_sub_expect,
            num_ul_meas_subst,
            num_meas_sub_subst
        );
        let sub_mismatch = if amr {
            num_meas_sub < num_sub_expect
        } else {
            num_meas_sub != num_sub_expect
        };
        if sub_mismatch {
            tracing::error!(
                "{} incorrect number of SUB measurements detected ({} vs exp {}{})",
                self.chan,
                num_meas_sub,
                if amr { ">=" } else { "" },
                num_sub_expect
            );
        }

        let ber_full = if num_expect > 0 {
            ber_full_sum / num_expect as u32
        } else {
            MEAS_DUMMY_BER as u32
        };
        let irssi_full = if num_ul_meas_actual == 0 {
            MEAS_DUMMY_IRSSI
        } else {
            irssi_full_sum / num_ul_meas_actual as u32
        };
        let (ta256, ci_full) = if num_ul_meas_actual == 0 {
            (self.meas.ms_toa256 as i32, self.meas.ul_ci_cb_full as i32)
        } else {
            (
                ta256_sum / num_ul_meas_actual as i32,
                ci_full_sum / num_ul_meas_actual as i32,
            )
        };
        let ber_sub = if num_meas_sub == 0 {
            MEAS_DUMMY_BER as u32
        } else {
            ber_sub_sum / num_meas_sub as u32
        };
        let (irssi_sub, ci_sub) = if num_meas_sub_actual == 0 {
            (MEAS_DUMMY_IRSSI, self.meas.ul_ci_cb_sub as i32)
        } else {
            (
                irssi_sub_sum / num_meas_sub_actual as u32,
                ci_sub_sum / num_meas_sub_actual as i32,
            )
        };

        tracing::info!(
            ts = fn_num,
            "{} computed TA256({}), BER-FULL({}.{:02}%), RSSI-FULL(-{}dBm), C/I-FULL({} cB), BER-SUB({}.{:02}%), RSSI-SUB(-{}dBm), C/I-SUB({} cB)",
            self.chan,
            ta256,
            ber_full / 100,
            ber_full % 100,
            irssi_full,
            ci_full,
            ber_sub / 100,
            ber_sub % 100,
            irssi_sub,
            ci_sub
        );

        let res = &mut self.meas.ul_res;
        res.full.rx_lev = dbm2rxlev(-(irssi_full as i32));
        res.sub.rx_lev = dbm2rxlev(-(irssi_sub as i32));
        res.full.rx_qual = ber10k_to_rxqual(ber_full);
        res.sub.rx_qual = ber10k_to_rxqual(ber_sub);
        self.meas.ms_toa256 = ta256 as i16;
        self.meas.ul_ci_cb_full = ci_full as i16;
        self.meas.ul_ci_cb_sub = ci_sub as i16;
        self.meas.res_valid = true;

        tracing::debug!(
            "{} UL MEAS RXLEV_FULL({}), RXLEV_SUB({}), RXQUAL_FULL({}), RXQUAL_SUB({})",
            self.chan,
            res.full.rx_lev,
            res.sub.rx_lev,
            res.full.rx_qual,
            res.sub.rx_qual
        );

        self.compute_extended(num_expect);

        self.meas.uplink.clear();
        self.meas.last_computed_fn = Some(fn_num);
        true
    }

    /// Min, max and standard deviation of the timing offset around the mean
    /// just stored by `compute_period`. Skipped when nothing was received.
    fn compute_extended(&mut self, num_expect: usize) {
        let num_stored = self.meas.uplink.len();
        if num_stored == 0 {
            return;
        }
        let n = num_stored.min(num_expect).max(1);
        let samples = &self.meas.uplink[num_stored - n..];
        let mean = self.meas.ms_toa256 as i32;

        let mut toa256_min = i16::MAX;
        let mut toa256_max = i16::MIN;
        // Each |diff| is at most 65535, so its square fits in u32
        let mut sq_diff_sum: u64 = 0;
        for m in samples {
            let diff_abs = (m.ta_offs_256bits as i32 - mean).unsigned_abs();
            sq_diff_sum += (diff_abs * diff_abs) as u64;
            toa256_min = toa256_min.min(m.ta_offs_256bits);
            toa256_max = toa256_max.max(m.ta_offs_256bits);
        }
        let variance = u32::try_from(sq_diff_sum / n as u64).unwrap_or(u32::MAX);

        self.meas.ext = ExtMeasStats {
            toa256_min,
            toa256_max,
            toa256_mean: self.meas.ms_toa256,
            toa256_std_dev: variance.isqrt() as u16,
        };
        self.meas.ext_valid = true;
    }

    /// Records a sample and computes the period if it just ended
    pub fn process_measurement(&mut self, sample: &UlMeasSample, fn_num: u32) -> bool {
        if let Err(e) = self.record_sample(sample, fn_num) {
            tracing::debug!("{} sample dropped: {}", self.chan, e);
        }
        self.compute_period(fn_num)
    }

    /// Starts measurements from scratch, called on activation
    pub fn meas_reset(&mut self) {
        self.meas = LchanMeas::default();
    }
}

#[cfg(test)]
mod tests {
    use gsm_core::{ChanNr, debug};

    use super::*;

    fn lchan(pchan: Pchan, lchan_type: LchanType, tch_mode: TchMode, ts: u8, ss: u8) -> Lchan {
        Lchan::new(ChanNr::new(0, ts, ss), pchan, lchan_type, tch_mode)
    }

    fn sample(ber10k: u16, inv_rssi: u8, ta: i16) -> UlMeasSample {
        UlMeasSample {
            ber10k,
            inv_rssi,
            ci_cb: 100,
            ta_offs_256bits: ta,
            is_sub: false,
        }
    }

    #[test]
    fn test_rxqual_thresholds() {
        assert_eq!(ber10k_to_rxqual(0), 0);
        assert_eq!(ber10k_to_rxqual(19), 0);
        assert_eq!(ber10k_to_rxqual(20), 1);
        assert_eq!(ber10k_to_rxqual(79), 2);
        assert_eq!(ber10k_to_rxqual(1279), 6);
        assert_eq!(ber10k_to_rxqual(1280), 7);
        assert_eq!(ber10k_to_rxqual(10000), 7);
    }

    #[test]
    fn test_is_sub() {
        let tchf = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechV1, 2, 0);
        assert!(tchf.is_sub(52));
        assert!(tchf.is_sub(104 + 52));
        assert!(!tchf.is_sub(53));

        let tchf_sign = lchan(Pchan::TchF, LchanType::TchF, TchMode::Signalling, 2, 0);
        assert!(tchf_sign.is_sub(17));

        let tchf_data = lchan(Pchan::TchF, LchanType::TchF, TchMode::Data, 2, 0);
        assert!(!tchf_data.is_sub(52));

        let tchh = lchan(Pchan::TchH, LchanType::TchH, TchMode::SpeechV1, 2, 1);
        for fn104 in [0, 52, 14, 66] {
            assert!(tchh.is_sub(fn104));
        }
        assert!(!tchh.is_sub(2));

        let amr = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechAmr, 2, 0);
        assert!(!amr.is_sub(52));

        let sdcch = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, 3);
        assert!(sdcch.is_sub(5));
    }

    #[test]
    fn test_period_complete_tables() {
        // TCH/F on ts 2 ends its period at 12, reported at 38
        let tchf = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechV1, 2, 0);
        let hits: Vec<u32> = (0..208).filter(|f| tchf.is_period_complete(*f)).collect();
        assert_eq!(hits, vec![38, 104 + 38]);

        let tchh1 = lchan(Pchan::TchH, LchanType::TchH, TchMode::SpeechV1, 7, 1);
        let hits: Vec<u32> = (0..104).filter(|f| tchh1.is_period_complete(*f)).collect();
        assert_eq!(hits, vec![103]);

        let sdcch8 = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, 5);
        let hits: Vec<u32> = (0..204).filter(|f| sdcch8.is_period_complete(*f)).collect();
        assert_eq!(hits, vec![0, 102]);

        let sdcch4 = lchan(Pchan::CcchSdcch4, LchanType::Sdcch, TchMode::Signalling, 0, 3);
        let hits: Vec<u32> = (0..102).filter(|f| sdcch4.is_period_complete(*f)).collect();
        assert_eq!(hits, vec![10]);

        let pdch = lchan(Pchan::Pdch, LchanType::Sdcch, TchMode::Signalling, 0, 0);
        assert!((0..104).all(|f| !pdch.is_period_complete(f)));
        assert_eq!(pdch.meas_modulus(), 1);
    }

    #[test]
    fn test_period_complete_once_per_period() {
        let hits = |l: &Lchan, len: u32| (0..len).filter(|f| l.is_period_complete(*f)).count();

        for ts in 0..8 {
            let tchf = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechV1, ts, 0);
            assert_eq!(hits(&tchf, 104), 1, "TCH/F ts {}", ts);
            assert_eq!(tchf.num_meas_expected(), 25);
            assert_eq!(tchf.num_meas_sub_expected(), 2);

            for ss in 0..2 {
                let tchh = lchan(Pchan::TchH, LchanType::TchH, TchMode::SpeechV1, ts, ss);
                assert_eq!(hits(&tchh, 104), 1, "TCH/H ts {} ss {}", ts, ss);
                assert_eq!(tchh.num_meas_expected(), 25);
                assert_eq!(tchh.num_meas_sub_expected(), 3);

                let tchh_sign = lchan(Pchan::TchH, LchanType::TchH, TchMode::Signalling, ts, ss);
                assert_eq!(tchh_sign.num_meas_expected(), 13);
                assert_eq!(tchh_sign.num_meas_sub_expected(), 13);
            }
        }

        for ss in 0..8 {
            let sdcch8 = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, ss);
            assert_eq!(hits(&sdcch8, 102), 1, "SDCCH/8 ss {}", ss);
            assert_eq!(sdcch8.num_meas_expected(), 3);
            assert_eq!(sdcch8.num_meas_sub_expected(), 3);
        }

        for ss in 0..4 {
            let sdcch4 = lchan(Pchan::CcchSdcch4, LchanType::Sdcch, TchMode::Signalling, 0, ss);
            assert_eq!(hits(&sdcch4, 102), 1, "SDCCH/4 ss {}", ss);
            assert_eq!(sdcch4.num_meas_expected(), 3);
            assert_eq!(sdcch4.num_meas_sub_expected(), 3);
        }

        let tchf_sign = lchan(Pchan::TchF, LchanType::TchF, TchMode::Signalling, 3, 0);
        assert_eq!(tchf_sign.num_meas_sub_expected(), 25);
        let amr = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechAmr, 3, 0);
        assert_eq!(amr.num_meas_sub_expected(), 1);
        let pdch = lchan(Pchan::Pdch, LchanType::Sdcch, TchMode::Signalling, 0, 0);
        assert_eq!(pdch.num_meas_sub_expected(), 0);
    }

    #[test]
    fn test_buffer_full() {
        let mut l = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechV1, 2, 0);
        for i in 0..MEAS_BUF_LEN as u32 {
            assert_eq!(l.record_sample(&sample(0, 60, 0), i + 1000), Ok(()));
        }
        assert_eq!(l.record_sample(&sample(0, 60, 0), 2000), Err(MeasError::BufferFull));
        assert_eq!(l.meas.num_ul_meas(), MEAS_BUF_LEN);
        assert_eq!(l.meas.last_fn, Some(1000 + MEAS_BUF_LEN as u32 - 1));
    }

    #[test]
    fn test_compute_full_period() {
        debug::setup_logging_verbose();
        let mut l = lchan(Pchan::TchF, LchanType::TchF, TchMode::Signalling, 2, 0);
        for i in 0..25 {
            l.record_sample(&sample(0, 70, 64), 100 + i).unwrap();
        }
        assert!(!l.compute_period(37));
        assert!(l.compute_period(38));

        assert!(l.meas.res_valid);
        assert_eq!(l.meas.ul_res.full.rx_lev, dbm2rxlev(-70));
        assert_eq!(l.meas.ul_res.sub.rx_lev, dbm2rxlev(-70));
        assert_eq!(l.meas.ul_res.full.rx_qual, 0);
        assert_eq!(l.meas.ul_res.sub.rx_qual, 0);
        assert_eq!(l.meas.ms_toa256, 64);
        assert_eq!(l.meas.ul_ci_cb_full, 100);
        assert!(l.meas.ext_valid);
        assert_eq!(l.meas.ext.toa256_std_dev, 0);
        assert_eq!(l.meas.num_ul_meas(), 0);

        // Same frame again is ignored
        assert!(!l.compute_period(38));
    }

    #[test]
    fn test_compute_substitutes_missing() {
        let mut l = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechV1, 2, 0);
        // 20 good FULL samples, the 2 SUB samples are missing
        for i in 0..20 {
            l.record_sample(&sample(0, 60, 0), 1 + i).unwrap();
        }
        assert!(l.compute_period(38));

        // 5 of 25 BER samples at 100%
        assert_eq!(l.meas.ul_res.full.rx_qual, ber10k_to_rxqual(5 * 10000 / 25));
        // RSSI only over received samples
        assert_eq!(l.meas.ul_res.full.rx_lev, dbm2rxlev(-60));
        // Both SUB samples came from dummies
        assert_eq!(l.meas.ul_res.sub.rx_qual, 7);
        assert_eq!(l.meas.ul_res.sub.rx_lev, dbm2rxlev(-109));
        assert_eq!(l.meas.ul_ci_cb_sub, 0);
    }

    #[test]
    fn test_compute_no_samples() {
        let mut l = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, 5);
        l.meas.ms_toa256 = 33;
        l.meas.ul_ci_cb_full = 12;
        assert!(l.compute_period(102));

        assert_eq!(l.meas.ul_res.full.rx_lev, 1);
        assert_eq!(l.meas.ul_res.full.rx_qual, 7);
        assert_eq!(l.meas.ul_res.sub.rx_qual, 7);
        assert_eq!(l.meas.ms_toa256, 33);
        assert_eq!(l.meas.ul_ci_cb_full, 12);
        assert!(!l.meas.ext_valid);
    }

    #[test]
    fn test_compute_drops_oldest_excess() {
        let mut l = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, 0);
        l.record_sample(&sample(10000, 100, 0), 10).unwrap();
        for i in 0..3 {
            l.record_sample(&sample(0, 50, 0), 11 + i).unwrap();
        }
        assert!(l.compute_period(66));
        assert_eq!(l.meas.ul_res.full.rx_qual, 0);
        assert_eq!(l.meas.ul_res.full.rx_lev, dbm2rxlev(-50));
    }

    #[test]
    fn test_amr_sub_not_promoted() {
        let mut l = lchan(Pchan::TchF, LchanType::TchF, TchMode::SpeechAmr, 0, 0);
        for i in 0..24 {
            l.record_sample(&sample(0, 80, 0), i).unwrap();
        }
        let mut sid = sample(0, 80, 0);
        sid.is_sub = true;
        l.record_sample(&sid, 24).unwrap();
        assert!(l.compute_period(12));
        assert_eq!(l.meas.ul_res.sub.rx_qual, 0);
        assert_eq!(l.meas.ul_res.sub.rx_lev, dbm2rxlev(-80));
    }

    #[test]
    fn test_extended_stats() {
        let mut l = lchan(Pchan::Sdcch8, LchanType::Sdcch, TchMode::Signalling, 1, 0);
        for (i, ta) in [-100i16, 0, 100].iter().enumerate() {
            l.record_sample(&sample(0, 70, *ta), 20 + i as u32).unwrap();
        }
        assert!(l.process_measurement(&sample(0, 70, 0), 66));

        // The 4th sample pushed the first one out as excess
        let ext = l.meas.ext;
        assert!(l.meas.ext_valid);
        assert_eq!(ext.toa256_min, 0);
        assert_eq!(ext.toa256_max, 100);
        assert_eq!(ext.toa256_mean, 33);
        // diffs -33, 67, -33: (1089 + 4489 + 1089) / 3 = 2222, isqrt 47
        assert_eq!(ext.toa256_std_dev, 47);
    }

    #[test]
    fn test_meas_reset() {
        let mut l = lchan(Pchan::TchF, LchanType::TchF, TchMode::Signalling, 2, 0);
        l.record_sample(&sample(0, 70, 0), 1).unwrap();
        l.compute_period(38);
        l.meas_reset();
        assert!(!l.meas.res_valid);
        assert_eq!(l.meas.num_ul_meas(), 0);
        // Guard is cleared as well
        assert!(l.compute_period(38));
    }
}
