/// Entities making up the BTS stack
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum BtsEntity {
    /// Physical layer (radio or virtual frame clock)
    Phy,
    /// Layer 1 service access point: logical channels, measurements, control loops
    L1sap,
    /// Object management: the NM object FSM tree
    Oml,
    /// Abis link towards the BSC
    Abis,
}
