pub mod virtual_phy;

pub use virtual_phy::VirtualPhy;
