//! Ports through which the outside world reaches the ledger and the ledger
//! reaches the bridge.

pub mod inbound;
pub mod outbound;
