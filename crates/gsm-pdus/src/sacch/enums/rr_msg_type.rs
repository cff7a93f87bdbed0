/// TS 44.018 clause 10.4, the RR message types relevant on the uplink SACCH
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RrMsgType {
    MeasurementReport = 0x15,
    ExtMeasurementReport = 0x36,
}

impl std::convert::TryFrom<u8> for RrMsgType {
    type Error = ();
    fn try_from(x: u8) -> Result<Self, Self::Error> {
        match x {
            0x15 => Ok(RrMsgType::MeasurementReport),
            0x36 => Ok(RrMsgType::ExtMeasurementReport),
            _ => Err(()),
        }
    }
}

impl RrMsgType {
    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u8 {
        self as u8
    }
}

impl core::fmt::Display for RrMsgType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RrMsgType::MeasurementReport => write!(f, "MeasurementReport"),
            RrMsgType::ExtMeasurementReport => write!(f, "ExtMeasurementReport"),
        }
    }
}

/// Protocol discriminator for radio resource management, low nibble of the first L3 octet
pub const GSM48_PDISC_RR: u8 = 0x06;
