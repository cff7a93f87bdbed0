pub mod abis_bs;
pub mod link_fsm;
pub mod transport;

pub use abis_bs::Abis;
pub use transport::{AbisError, AbisTransport, TcpTransport, TransportEvent};
