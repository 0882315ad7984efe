//! Street network model

pub mod components;
pub mod network;

pub use components::{ModePermissions, StreetEdge, StreetMode, StreetNode};
pub use network::{IndexedPoint, StreetGraph};
