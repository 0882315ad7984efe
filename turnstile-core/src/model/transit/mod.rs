//! Public transit data model

pub mod builder;
pub mod data;
pub mod types;

pub use builder::TransitDataBuilder;
pub use data::PublicTransitData;
pub use types::{Cost, RaptorStopId, Route, RouteId, Stop, StopTime, Time, Transfer};
