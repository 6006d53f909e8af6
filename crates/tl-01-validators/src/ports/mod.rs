//! Port definitions: inbound API surface and outbound dependencies.

pub mod inbound;
pub mod outbound;
