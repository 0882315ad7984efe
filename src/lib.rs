//! Multimodal trip search with turn-aware street legs and destination
//! pruning.
//!
//! The functions here wire the pieces of [`turnstile_core`] together for a
//! single model and configuration. Lower-level building blocks are
//! available through [`prelude`].

use turnstile_core::{Cost, Error, HeuristicProvider, SearchConfig, TransitModel};
use turnstile_core::{HeuristicTable, Location, StreetEdgeId, StreetMode, TurnCostCalculator};

pub mod matrix;
pub mod request;

pub use matrix::travel_time_matrix;
pub use request::{RequestContext, TripPlan};
pub use turnstile_core::prelude;

/// Penalty for turning from `incoming` onto `outgoing` in `mode`
pub fn compute_turn_cost(
    model: &TransitModel,
    config: &SearchConfig,
    incoming: StreetEdgeId,
    outgoing: StreetEdgeId,
    mode: StreetMode,
) -> Result<Cost, Error> {
    let calculator = TurnCostCalculator::new(&model.street_graph, &config.turn_costs);
    Ok(calculator.compute_turn_cost(incoming, outgoing, mode)?)
}

/// Turn angle in radians between two consecutive edges. `π` is straight
/// ahead, `0` a full reversal.
pub fn compute_angle(
    model: &TransitModel,
    config: &SearchConfig,
    incoming: StreetEdgeId,
    outgoing: StreetEdgeId,
) -> Result<f64, Error> {
    let calculator = TurnCostCalculator::new(&model.street_graph, &config.turn_costs);
    Ok(calculator.compute_angle(incoming, outgoing)?)
}

/// Lower bounds toward `location` for every stop and street vertex
pub fn build_heuristic_table(
    model: &TransitModel,
    config: &SearchConfig,
    location: Location,
) -> HeuristicTable {
    HeuristicProvider::new(model, config).build_for_location(location)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use turnstile_core::prelude::*;

    pub(crate) fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn turn_costs_through_the_facade() {
        init_logging();
        let fixture = request::tests::fixture();
        let model = &fixture.model;
        let config = SearchConfig::default();
        let (there, back) = (fixture.there, fixture.back);

        let angle = compute_angle(model, &config, there, back).unwrap();
        assert!(angle < 1e-9 || angle > 2.0 * PI - 1e-9, "angle {angle}");
        assert_eq!(
            compute_turn_cost(model, &config, there, back, StreetMode::Car).unwrap(),
            90
        );
        assert_eq!(
            compute_turn_cost(model, &config, there, back, StreetMode::Walk).unwrap(),
            0
        );
        assert!(matches!(
            compute_turn_cost(model, &config, back, back, StreetMode::Car),
            Err(Error::TurnCost(TurnCostError::DisconnectedEdges { .. }))
        ));
    }

    #[test]
    fn heuristic_table_for_a_stop() {
        init_logging();
        let fixture = request::tests::fixture();
        let config = SearchConfig::default();
        let table = build_heuristic_table(&fixture.model, &config, Location::Stop(1));

        assert_eq!(table.stop(1), DestinationHeuristic::ZERO);
        assert_eq!(
            table.stop(0),
            DestinationHeuristic {
                min_travel_time: 1000,
                min_transfers: 1,
                min_cost: 1000 + config.cost_model.board_cost,
            }
        );
        // The target walks to D, the origin has to ride
        assert_eq!(table.vertex(fixture.target).min_transfers, 0);
        assert_eq!(table.vertex(fixture.origin).min_transfers, 1);
        assert!(table.vertex(fixture.origin).min_travel_time > 1000);
    }
}
