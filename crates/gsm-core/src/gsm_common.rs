/// Service access points between the entities of the stack
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sap {
    /// Phy -> L1sap: uplink measurement samples and SACCH blocks
    PhSap,
    /// L1sap -> Phy: transmit parameter changes and deactivation
    MphSap,

    /// L1sap <-> Abis: channel activation, measurement results
    RslSap,
    /// Oml <-> Abis: object management reports and requests
    OmlSap,

    /// Custom SAP for inter-entity control messages (link up/down, releases)
    Control,
}
