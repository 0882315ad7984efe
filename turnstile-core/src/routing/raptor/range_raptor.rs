use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use super::pruned_raptor::{AccessLeg, RaptorRequest, pruned_raptor};
use super::state::{RaptorError, validate_time};
use crate::config::CostModel;
use crate::heuristic::{EgressLeg, HeuristicTable};
use crate::{Cost, Error, PublicTransitData, Time};

/// Range query over every useful departure in a time window
#[derive(Debug, Clone, Copy)]
pub struct RangeRequest<'a> {
    pub access: &'a [AccessLeg],
    pub egress: &'a [EgressLeg],
    /// Inclusive `(earliest, latest)` departure from the origin
    pub departure_range: (Time, Time),
    pub max_transfers: usize,
    pub max_cost: Option<Cost>,
    pub costs: &'a CostModel,
}

/// Result for one departure of a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeJourney {
    pub departure_time: Time,
    /// Arrival at the destination, if a journey was found
    pub arrival_time: Option<Time>,
    pub transfers: usize,
    pub cost: Option<Cost>,
}

impl RangeJourney {
    pub fn travel_time(&self) -> Option<Time> {
        self.arrival_time
            .map(|arrival| arrival.saturating_sub(self.departure_time))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeSearchResult {
    /// Ordered by departure time
    pub journeys: Vec<RangeJourney>,
    pub median_travel_time: Option<Time>,
    /// Labels the heuristic pruned, summed over all departures
    pub pruned_labels: usize,
}

impl RangeSearchResult {
    fn new(journeys: Vec<RangeJourney>, pruned_labels: usize) -> Self {
        let mut travel_times: Vec<Time> = journeys
            .iter()
            .filter_map(RangeJourney::travel_time)
            .collect();
        travel_times.sort_unstable();
        let median_travel_time = travel_times.get(travel_times.len() / 2).copied();
        Self {
            journeys,
            median_travel_time,
            pruned_labels,
        }
    }

    pub fn travel_times(&self) -> Vec<Time> {
        self.journeys
            .iter()
            .filter_map(RangeJourney::travel_time)
            .collect()
    }

    pub fn as_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Origin departures worth searching: every trip departure at an access
/// stop, shifted back by the access duration, that falls in the range.
pub fn candidate_departures(
    data: &PublicTransitData,
    access: &[AccessLeg],
    departure_range: (Time, Time),
) -> Result<Vec<Time>, RaptorError> {
    let (earliest, latest) = departure_range;
    let mut departures = Vec::new();
    for leg in access {
        let at_stop = data.get_source_departures(
            leg.stop,
            earliest.saturating_add(leg.duration),
            latest.saturating_add(leg.duration),
        )?;
        departures.extend(at_stop.into_iter().map(|dep| dep - leg.duration));
    }
    departures.sort_unstable();
    departures.dedup();
    Ok(departures)
}

/// Runs [`pruned_raptor`] for every candidate departure in parallel. All
/// runs share the same read-only heuristic table.
pub fn range_search(
    data: &PublicTransitData,
    heuristics: &HeuristicTable,
    request: &RangeRequest<'_>,
) -> Result<RangeSearchResult, RaptorError> {
    let (earliest, latest) = request.departure_range;
    validate_time(latest)?;
    if earliest > latest {
        return Err(RaptorError::InvalidTime);
    }

    let departures = candidate_departures(data, request.access, request.departure_range)?;
    debug!(
        "Range search over {} departures in [{earliest}, {latest}]",
        departures.len()
    );

    let results = departures
        .par_iter()
        .map(|&departure_time| {
            let single = RaptorRequest {
                access: request.access,
                egress: request.egress,
                departure_time,
                max_transfers: request.max_transfers,
                max_cost: request.max_cost,
                costs: request.costs,
            };
            pruned_raptor(data, heuristics, &single).map(|result| (departure_time, result))
        })
        .collect::<Result<Vec<_>, RaptorError>>()?;

    let pruned_labels = results.iter().map(|(_, result)| result.stats.pruned).sum();
    let journeys = results
        .into_iter()
        .map(|(departure_time, result)| RangeJourney {
            departure_time,
            arrival_time: result.arrival_time,
            transfers: result.transfers(),
            cost: result.cost,
        })
        .collect();
    Ok(RangeSearchResult::new(journeys, pruned_labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SearchConfig;
    use crate::heuristic::{Destination, HeuristicProvider};
    use crate::routing::raptor::pruned_raptor::tests::network;

    const ACCESS: [AccessLeg; 1] = [AccessLeg {
        stop: 0,
        duration: 60,
        cost: 120,
    }];
    const EGRESS: [EgressLeg; 1] = [EgressLeg {
        stop: 3,
        duration: 0,
        cost: 0,
    }];

    fn request(costs: &CostModel, departure_range: (Time, Time)) -> RangeRequest<'_> {
        RangeRequest {
            access: &ACCESS,
            egress: &EGRESS,
            departure_range,
            max_transfers: 3,
            max_cost: None,
            costs,
        }
    }

    #[test]
    fn searches_each_trip_departure() {
        let model = network();
        let data = &model.transit_data;
        assert_eq!(
            candidate_departures(data, &ACCESS, (0, 400)).unwrap(),
            vec![40, 340]
        );
        assert_eq!(candidate_departures(data, &ACCESS, (50, 300)).unwrap(), Vec::<Time>::new());

        let config = SearchConfig::default();
        let heuristics = HeuristicProvider::new(&model, &config).build(&Destination {
            egress: EGRESS.to_vec(),
            vertex: None,
        });
        let result = range_search(data, &heuristics, &request(&config.cost_model, (0, 400))).unwrap();

        assert_eq!(
            result.journeys,
            vec![
                RangeJourney {
                    departure_time: 40,
                    arrival_time: Some(330),
                    transfers: 1,
                    cost: Some(590),
                },
                RangeJourney {
                    departure_time: 340,
                    arrival_time: Some(630),
                    transfers: 1,
                    cost: Some(590),
                },
            ]
        );
        assert_eq!(result.travel_times(), vec![290, 290]);
        assert_eq!(result.median_travel_time, Some(290));

        let json = result.as_json().unwrap();
        assert!(json.contains("\"departure_time\":40"));
        assert!(json.contains("\"median_travel_time\":290"));
    }

    #[test]
    fn rejects_bad_ranges() {
        let model = network();
        let config = SearchConfig::default();
        let heuristics = HeuristicTable::zeroed(model.transit_data.num_stops(), 0);
        for range in [(500, 100), (0, 86400 * 3)] {
            assert_eq!(
                range_search(&model.transit_data, &heuristics, &request(&config.cost_model, range))
                    .unwrap_err(),
                RaptorError::InvalidTime
            );
        }
    }

    #[test]
    fn empty_window_gives_no_journeys() {
        let model = network();
        let config = SearchConfig::default();
        let heuristics = HeuristicTable::zeroed(model.transit_data.num_stops(), 0);
        let result = range_search(
            &model.transit_data,
            &heuristics,
            &request(&config.cost_model, (1000, 2000)),
        )
        .unwrap();
        assert!(result.journeys.is_empty());
        assert_eq!(result.median_travel_time, None);
    }
}
