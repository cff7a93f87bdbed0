pub mod l1_header;
pub mod meas_results;
