/// Link notifications exchanged between Phy, Abis and Oml
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkControl {
    /// PHY transceiver ready. Sent by Phy to Oml.
    PhyLinkUp { trx: u8 },
    /// PHY transceiver lost. Sent by Phy to Oml.
    PhyLinkDown { trx: u8 },
    /// OML signalling link established. Sent by Abis to Oml.
    OmlLinkUp,
    /// RSL signalling link for a TRX established. Sent by Abis to Oml.
    RslLinkUp { trx: u8 },
    /// Abis link reached its terminal failure state. Sent by Abis to Oml.
    AbisLinkFailed,
}

/// Release every logical channel on a timeslot. Sent by Oml to L1sap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsReleaseReq {
    pub trx: u8,
    pub ts: u8,
}
