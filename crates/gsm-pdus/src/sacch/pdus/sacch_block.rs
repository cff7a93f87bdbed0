use core::fmt;

use gsm_core::PduParseErr;

use crate::sacch::enums::rr_msg_type::{GSM48_PDISC_RR, RrMsgType};
use crate::sacch::fields::l1_header::SacchL1Header;
use crate::sacch::fields::meas_results::MeasResults;

/// Length of a SACCH MAC block in octets
pub const GSM_MACBLOCK_LEN: usize = 23;

/// LAPDm address field: SAPI=0, C/R=0, EA=1
const LAPDM_ADDR_SAPI0: u8 = 0x01;
/// LAPDm control field: U format, UI
const LAPDM_CTRL_UI: u8 = 0x03;

/// Offset of the L3 header: L1 SACCH header (2) + LAPDm address, control, length (3)
pub const SACCH_L3_OFFSET: usize = SacchL1Header::LEN + 3;

/// RR measurement report found in an uplink SACCH block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrMeasReport {
    pub msg_type: RrMsgType,
    /// Decoded serving cell results, only for a plain MEASUREMENT REPORT
    pub meas_res: Option<MeasResults>,
}

/// An uplink SACCH block as received from the PHY
#[derive(Debug, Clone)]
pub struct SacchBlock {
    pub l1: SacchL1Header,
    pub meas_rep: Option<RrMeasReport>,
    /// Raw block, kept so the L3 part can be forwarded verbatim
    raw: Vec<u8>,
}

impl SacchBlock {
    /// Parse a 23 octet block. Blocks that do not carry a measurement report
    /// still yield the L1 header.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PduParseErr> {
        if data.len() != GSM_MACBLOCK_LEN {
            return Err(PduParseErr::InconsistentLength {
                expected: GSM_MACBLOCK_LEN,
                found: data.len(),
            });
        }

        let l1 = SacchL1Header::from_bytes(data)?;
        let meas_rep = match Self::rr_meas_rep_type(data) {
            Some(msg_type) => {
                let meas_res = match msg_type {
                    RrMsgType::MeasurementReport => Some(MeasResults::from_bytes(&data[SACCH_L3_OFFSET + 2..])?),
                    RrMsgType::ExtMeasurementReport => None,
                };
                Some(RrMeasReport { msg_type, meas_res })
            }
            None => {
                tracing::trace!("SACCH block without measurement report: {:02x?}", &data[SacchL1Header::LEN..SACCH_L3_OFFSET + 2]);
                None
            }
        };

        Ok(SacchBlock {
            l1,
            meas_rep,
            raw: data.to_vec(),
        })
    }

    /// Message type of an RR (extended) measurement report carried in a
    /// LAPDm UI frame on SAPI 0
    fn rr_meas_rep_type(data: &[u8]) -> Option<RrMsgType> {
        let lapdm_hdr = &data[SacchL1Header::LEN..];
        if lapdm_hdr[0] != LAPDM_ADDR_SAPI0 || lapdm_hdr[1] != LAPDM_CTRL_UI {
            return None;
        }
        if data[SACCH_L3_OFFSET] & 0x0f != GSM48_PDISC_RR {
            return None;
        }
        RrMsgType::try_from(data[SACCH_L3_OFFSET + 1]).ok()
    }

    /// The L3 part of the block, only present for measurement reports
    pub fn l3(&self) -> Option<&[u8]> {
        self.meas_rep.as_ref().map(|_| &self.raw[SACCH_L3_OFFSET..])
    }

    /// Serving cell results of a plain measurement report
    pub fn meas_res(&self) -> Option<&MeasResults> {
        self.meas_rep.as_ref().and_then(|r| r.meas_res.as_ref())
    }

    /// Build a block carrying a MEASUREMENT REPORT, padded like LAPDm does
    pub fn build_meas_rep(l1: SacchL1Header, mr: &MeasResults) -> Vec<u8> {
        let mut data = vec![0x2b; GSM_MACBLOCK_LEN];
        data[..2].copy_from_slice(&l1.to_bytes());
        data[2] = LAPDM_ADDR_SAPI0;
        data[3] = LAPDM_CTRL_UI;
        // Length indicator: 18 octets of L3, EL bit set
        data[4] = (18 << 2) | 0x01;
        data[SACCH_L3_OFFSET] = GSM48_PDISC_RR;
        data[SACCH_L3_OFFSET + 1] = RrMsgType::MeasurementReport.into_raw();
        data[SACCH_L3_OFFSET + 2..SACCH_L3_OFFSET + 5].copy_from_slice(&mr.to_bytes());
        // No neighbour cells reported
        data[SACCH_L3_OFFSET + 5..].iter_mut().for_each(|b| *b = 0);
        data
    }
}

impl fmt::Display for SacchBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SacchBlock {{ l1: {:?} meas_rep: {:?} }}", self.l1, self.meas_rep)
    }
}

#[cfg(test)]
mod tests {
    use gsm_core::debug;

    use super::*;

    fn test_mr() -> MeasResults {
        MeasResults {
            ba_used: false,
            dtx_used: false,
            rxlev_full: 40,
            meas_valid: true,
            rxlev_sub: 38,
            rxqual_full: 2,
            rxqual_sub: 1,
        }
    }

    #[test]
    fn test_parse_meas_rep() {
        debug::setup_logging_verbose();
        let l1 = SacchL1Header { ms_pwr: 7, fpc_epc: false, srr_sro: true, ta: 12 };
        let data = SacchBlock::build_meas_rep(l1, &test_mr());
        let blk = SacchBlock::from_bytes(&data).unwrap();
        tracing::info!("Parsed: {}", blk);

        assert_eq!(blk.l1, l1);
        assert_eq!(blk.meas_res(), Some(&test_mr()));
        let l3 = blk.l3().unwrap();
        assert_eq!(l3.len(), GSM_MACBLOCK_LEN - SACCH_L3_OFFSET);
        assert_eq!(l3[1], 0x15);
    }

    #[test]
    fn test_parse_non_meas_rep() {
        let mut data = SacchBlock::build_meas_rep(SacchL1Header::default(), &test_mr());
        // SAPI 3 instead of SAPI 0
        data[2] = 0x0d;
        let blk = SacchBlock::from_bytes(&data).unwrap();
        assert!(blk.meas_rep.is_none());
        assert!(blk.l3().is_none());

        // Wrong protocol discriminator
        let mut data = SacchBlock::build_meas_rep(SacchL1Header::default(), &test_mr());
        data[SACCH_L3_OFFSET] = 0x05;
        assert!(SacchBlock::from_bytes(&data).unwrap().meas_rep.is_none());

        // Other RR message on SACCH
        let mut data = SacchBlock::build_meas_rep(SacchL1Header::default(), &test_mr());
        data[SACCH_L3_OFFSET + 1] = 0x10;
        let blk = SacchBlock::from_bytes(&data).unwrap();
        assert!(blk.meas_rep.is_none());
        assert!(blk.l3().is_none());

        // Extended report: recognised but the serving cell results are not decoded
        let mut data = SacchBlock::build_meas_rep(SacchL1Header::default(), &test_mr());
        data[SACCH_L3_OFFSET + 1] = 0x36;
        let blk = SacchBlock::from_bytes(&data).unwrap();
        assert_eq!(blk.meas_rep.as_ref().unwrap().msg_type, RrMsgType::ExtMeasurementReport);
        assert!(blk.meas_res().is_none());
    }

    #[test]
    fn test_wrong_length() {
        assert_eq!(
            SacchBlock::from_bytes(&[0u8; 22]).err(),
            Some(PduParseErr::InconsistentLength { expected: 23, found: 22 })
        );
    }
}
