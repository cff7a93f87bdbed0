pub mod rr_msg_type;
