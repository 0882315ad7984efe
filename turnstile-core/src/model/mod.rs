//! Data model for multimodal routing
//!
//! Street network arena, public transit arena and the model tying them
//! together. Both graphs are built once and only read during a search.

pub mod streets;
pub mod transit;
pub mod transit_model;

pub use streets::{StreetEdge, StreetGraph, StreetMode, StreetNode};
pub use transit::data::PublicTransitData;
pub use transit::types::{Cost, RaptorStopId, Route, RouteId, Stop, StopTime, Time, Transfer};
pub use transit_model::{TransitModel, TransitModelMeta};
