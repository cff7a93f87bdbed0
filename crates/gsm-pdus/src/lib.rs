//! Byte-level parsing of the uplink SACCH block: L1 header, LAPDm header
//! and the RR Measurement Report carried in it.

pub mod sacch;
