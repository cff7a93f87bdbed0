pub mod bts_model;
pub mod fsm;
pub mod nm_bb_transc_fsm;
pub mod nm_bts_fsm;
pub mod nm_bts_sm_fsm;
pub mod nm_channel_fsm;
pub mod nm_common;
pub mod nm_event;
pub mod nm_gprs_nse_fsm;
pub mod nm_rcarrier_fsm;
pub mod nm_tree;
pub mod oml_bs;

pub use nm_common::{dispatch, dispatch_if_permitted};
