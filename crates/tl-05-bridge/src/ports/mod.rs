//! Ports through which the outside world reaches the bridge and the bridge
//! reaches the outside world.

pub mod inbound;
pub mod outbound;
