//! Port definitions: inbound API surface.

pub mod inbound;
