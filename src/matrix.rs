use log::warn;
use rayon::prelude::*;

use turnstile_core::prelude::*;
use turnstile_core::StreetNodeId;

use crate::request::RequestContext;

/// Median travel time between every pair of vertices over
/// `departure_range`. Rows are origins, `None` where no journey exists.
pub fn travel_time_matrix(
    context: &RequestContext<'_>,
    points: &[StreetNodeId],
    departure_range: (Time, Time),
) -> Vec<Vec<Option<Time>>> {
    points
        .par_iter()
        .map(|&origin| {
            points
                .iter()
                .map(|&destination| {
                    if origin == destination {
                        return Some(0);
                    }
                    match context.plan(origin, Location::Vertex(destination), departure_range) {
                        Ok(plan) => plan.result.median_travel_time,
                        Err(e) => {
                            warn!(
                                "Routing failed for {} -> {}, error: {e}",
                                origin.index(),
                                destination.index()
                            );
                            None
                        }
                    }
                })
                .collect()
        })
        .collect()
}
