pub mod sacch_block;
