pub mod acch;
pub mod l1sap_bs;
pub mod lchan;
pub mod measurement;
pub mod power_control;
pub mod sacch;
pub mod ta_control;

pub use l1sap_bs::L1sap;
pub use lchan::Lchan;
pub use measurement::MeasError;
