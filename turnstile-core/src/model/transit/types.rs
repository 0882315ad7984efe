use geo::Point;

/// Seconds since the start of the service day
pub type Time = u32;
/// Generalized cost in seconds-equivalent units
pub type Cost = u32;
/// Dense stop index used by the transit searches
pub type RaptorStopId = usize;
/// Dense route (pattern) index
pub type RouteId = usize;

/// Arrival and departure of one trip at one stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
}

impl StopTime {
    pub fn new(arrival: Time, departure: Time) -> Self {
        Self { arrival, departure }
    }
}

/// A route is a pattern: every trip visits the same stop sequence
#[derive(Debug, Clone)]
pub struct Route {
    pub route_id: String,
    pub num_trips: usize,
    pub num_stops: usize,
    /// Offset of the first stop in `route_stops`
    pub stops_start: usize,
    /// Offset of the first trip in `stop_times`, trips are stored row-major
    pub trips_start: usize,
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub stop_id: String,
    pub geometry: Point<f64>,
    pub routes_start: usize,
    pub routes_len: usize,
    pub transfers_start: usize,
    pub transfers_len: usize,
}

/// Precomputed walking connection between two stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub target_stop: RaptorStopId,
    pub duration: Time,
}
