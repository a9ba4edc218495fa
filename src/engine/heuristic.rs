// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use fixedbitset::FixedBitSet;

use super::strategy::RoutingStrategy;
use crate::constrained_transfer::{ConstrainedTransferIndex, TransfersForPattern};
use crate::cost::{Cost, CostCalculator};
use crate::request::AccessEgress;
use crate::search_direction::SearchDirection;
use crate::time::{Time, UNREACHED};
use crate::transit_data::{HeuristicTrip, Pattern, StopIdx, Timetable, Transfer};

/// Lower bounds from a stop toward the end of the search that computed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicAtStop {
    pub duration: Time,
    /// Transfers still needed after arriving at the stop on board of a trip.
    /// This is also the number of rides from the stop.
    pub number_of_transfers: u8,
    pub cost: Cost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicSummary {
    pub best_overall_duration: Time,
    pub best_number_of_transfers: u8,
    pub destination_reachable: bool,
}

/// Result of a heuristic search, one value per stop.
#[derive(Debug, Clone)]
pub struct Heuristics {
    durations: Vec<Time>,
    costs: Vec<Cost>,
    rounds: Vec<u8>,
}

impl Heuristics {
    /// `None` when the stop cannot be reached within the allowed number of rounds.
    pub fn at(&self, stop: StopIdx) -> Option<HeuristicAtStop> {
        if !self.is_reached(stop) {
            return None;
        }
        Some(HeuristicAtStop {
            duration: self.durations[stop],
            number_of_transfers: self.rounds[stop],
            cost: self.costs[stop],
        })
    }

    pub fn is_reached(&self, stop: StopIdx) -> bool {
        self.durations
            .get(stop)
            .map_or(false, |duration| *duration != UNREACHED)
    }

    pub fn nb_of_reached_stops(&self) -> usize {
        self.durations
            .iter()
            .filter(|duration| **duration != UNREACHED)
            .count()
    }

    /// Best values over the legs at the other end of the search.
    pub fn summary(&self, legs: &[AccessEgress]) -> HeuristicSummary {
        let mut summary = HeuristicSummary {
            best_overall_duration: UNREACHED,
            best_number_of_transfers: u8::MAX,
            destination_reachable: false,
        };
        for leg in legs {
            if let Some(at_stop) = self.at(leg.stop) {
                let nb_of_transfers = if leg.on_board {
                    at_stop.number_of_transfers
                } else {
                    at_stop.number_of_transfers.saturating_sub(1)
                };
                summary.destination_reachable = true;
                summary.best_overall_duration = summary
                    .best_overall_duration
                    .min(at_stop.duration + leg.duration);
                summary.best_number_of_transfers =
                    summary.best_number_of_transfers.min(nb_of_transfers);
            }
        }
        summary
    }
}

// best values on the trip being ridden, relative to the offsets of the boarding position
#[derive(Debug, Clone, Copy)]
struct Onboard {
    duration: Time,
    cost: Cost,
}

/// A routing strategy computing durations, costs and number of rides as lower bounds,
/// by riding one heuristic trip per pattern without looking at the timetables.
///
/// Slacks are ignored. The board cost of a ride is charged where the searched direction
/// boards it, except at positions that stay-seated transfers may reach.
pub struct HeuristicRoutingStrategy<'data> {
    direction: SearchDirection,
    calculator: CostCalculator,
    round: u8,

    durations: Vec<Time>,
    costs: Vec<Cost>,
    transit_durations: Vec<Time>,
    transit_costs: Vec<Cost>,
    rounds: Vec<u8>,

    touched_current_round: FixedBitSet,
    touched_previous_round: FixedBitSet,
    touched_by_transit: FixedBitSet,

    constrained_transfers: Option<&'data ConstrainedTransferIndex>,
    // constrained transfers of the pattern being ridden, seen from the searched direction
    pattern_transfers: Option<&'data TransfersForPattern>,

    heuristic_trip: Option<HeuristicTrip>,
    transit_factor: i32,
    onboard: Option<Onboard>,
}

impl<'data> HeuristicRoutingStrategy<'data> {
    pub fn new(nb_of_stops: usize, direction: SearchDirection, calculator: CostCalculator) -> Self {
        Self {
            direction,
            calculator,
            round: 0,
            durations: vec![UNREACHED; nb_of_stops],
            costs: vec![UNREACHED; nb_of_stops],
            transit_durations: vec![UNREACHED; nb_of_stops],
            transit_costs: vec![UNREACHED; nb_of_stops],
            rounds: vec![u8::MAX; nb_of_stops],
            touched_current_round: FixedBitSet::with_capacity(nb_of_stops),
            touched_previous_round: FixedBitSet::with_capacity(nb_of_stops),
            touched_by_transit: FixedBitSet::with_capacity(nb_of_stops),
            constrained_transfers: None,
            pattern_transfers: None,
            heuristic_trip: None,
            transit_factor: 0,
            onboard: None,
        }
    }

    /// Stay-seated transfers of `index` lower the board cost of the rides they lead to.
    pub fn with_constrained_transfers(mut self, index: Option<&'data ConstrainedTransferIndex>) -> Self {
        self.constrained_transfers = index;
        self
    }

    pub fn into_heuristics(self) -> Heuristics {
        Heuristics {
            durations: self.durations,
            costs: self.costs,
            rounds: self.rounds,
        }
    }

    // offset to remove from the duration at the boarding position
    fn board_offset(&self, trip: &HeuristicTrip, position: usize) -> Time {
        match self.direction {
            SearchDirection::Forward => -trip.departure_offset(position),
            SearchDirection::Reverse => trip.arrival_offset(position),
        }
    }

    fn alight_offset(&self, trip: &HeuristicTrip, position: usize) -> Time {
        match self.direction {
            SearchDirection::Forward => trip.arrival_offset(position),
            SearchDirection::Reverse => -trip.departure_offset(position),
        }
    }

    // board cost of the ride alighted at `position`, boarded there in the searched direction
    fn board_cost_at(&self, position: usize) -> Cost {
        match self.pattern_transfers {
            Some(transfers) if transfers.stay_seated_exist(position) => 0,
            _ => self.calculator.board_cost(),
        }
    }

    // - update the best values at `stop` and the touched stops
    fn arrive(&mut self, stop: StopIdx, duration: Time, cost: Cost, on_board: bool) {
        if stop >= self.durations.len() {
            return;
        }
        let mut improved = false;
        if duration < self.durations[stop] {
            self.durations[stop] = duration;
            improved = true;
        }
        if cost < self.costs[stop] {
            self.costs[stop] = cost;
            improved = true;
        }
        if on_board {
            let mut improved_on_board = false;
            if duration < self.transit_durations[stop] {
                self.transit_durations[stop] = duration;
                improved_on_board = true;
            }
            if cost < self.transit_costs[stop] {
                self.transit_costs[stop] = cost;
                improved_on_board = true;
            }
            if improved_on_board {
                self.touched_by_transit.insert(stop);
                improved = true;
            }
        }
        if improved {
            self.rounds[stop] = self.rounds[stop].min(self.round);
            self.touched_current_round.insert(stop);
        }
    }
}

impl<'data> RoutingStrategy<'data> for HeuristicRoutingStrategy<'data> {
    type Arrival = StopIdx;

    fn setup_iteration(&mut self, _iteration_time: Time) {
        self.round = 0;
        self.touched_current_round.clear();
        self.touched_previous_round.clear();
        self.touched_by_transit.clear();
    }

    fn set_access_to_stop(&mut self, access: &AccessEgress, _iteration_time: Time) {
        self.arrive(access.stop, access.duration, access.cost, false);
    }

    fn set_on_board_access_to_stop(&mut self, access: &AccessEgress, _iteration_time: Time) {
        self.arrive(access.stop, access.duration, access.cost, true);
    }

    fn prepare_for_next_round(&mut self, round: u8) -> bool {
        std::mem::swap(
            &mut self.touched_previous_round,
            &mut self.touched_current_round,
        );
        self.touched_current_round.clear();
        self.touched_by_transit.clear();
        self.round = round;
        self.touched_previous_round.ones().next().is_some()
    }

    fn stops_touched_previous_round(&self) -> &FixedBitSet {
        &self.touched_previous_round
    }

    fn stops_touched_by_transit_current_round(&self) -> &FixedBitSet {
        &self.touched_by_transit
    }

    fn prepare_for_transit_with(&mut self, pattern: &'data Pattern, timetable: &'data Timetable) {
        let searched_direction = self.direction.opposite();
        self.pattern_transfers = self
            .constrained_transfers
            .map(|index| index.transfers_for_pattern(searched_direction, pattern.idx()));
        let heuristic_trip = timetable.heuristic_trip();
        self.transit_factor = self
            .calculator
            .transit_factor_at(heuristic_trip.transit_reluctance_index());
        self.heuristic_trip = Some(heuristic_trip);
        self.onboard = None;
    }

    fn alight(&mut self, stop: StopIdx, position: usize) {
        let (onboard, offset) = match (&self.onboard, &self.heuristic_trip) {
            (Some(onboard), Some(trip)) => (*onboard, self.alight_offset(trip, position)),
            _ => return,
        };
        let duration = onboard.duration + offset;
        let cost = onboard.cost + self.transit_factor * offset + self.board_cost_at(position);
        self.arrive(stop, duration, cost, true);
    }

    fn boardings_at(&self, stop: StopIdx, arrivals: &mut Vec<StopIdx>) {
        if self.durations.get(stop).map_or(false, |duration| *duration != UNREACHED) {
            arrivals.push(stop);
        }
    }

    fn board_with_constrained_transfer(&mut self, _: StopIdx, _: StopIdx, _: usize) -> bool {
        false
    }

    fn board_with_regular_transfer(&mut self, arrival: StopIdx, _stop: StopIdx, position: usize) {
        let offset = match &self.heuristic_trip {
            Some(trip) => self.board_offset(trip, position),
            None => return,
        };
        let duration = self.durations[arrival] + offset;
        let cost = self.costs[arrival] + self.transit_factor * offset;
        let onboard = match self.onboard {
            Some(onboard) => Onboard {
                duration: onboard.duration.min(duration),
                cost: onboard.cost.min(cost),
            },
            None => Onboard { duration, cost },
        };
        self.onboard = Some(onboard);
    }

    fn transfer_to_stops(&mut self, from_stop: StopIdx, transfers: &'data [Transfer]) {
        let duration = self.transit_durations[from_stop];
        let cost = self.transit_costs[from_stop];
        if duration == UNREACHED {
            return;
        }
        for transfer in transfers {
            let to_stop = self.direction.transfer_target(transfer);
            self.arrive(
                to_stop,
                duration + transfer.duration,
                cost + self.calculator.walk_cost(transfer.duration),
                false,
            );
        }
    }

    fn round_complete(&mut self) {}

    fn iteration_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::worker::RangeRaptorWorker;
    use crate::request::Deadline;
    use crate::transit_data::builder::TransitDataBuilder;
    use crate::transit_data::TransitDataProvider;

    fn run(
        data: &crate::transit_data::TransitData,
        direction: SearchDirection,
        seeds: &[AccessEgress],
    ) -> Heuristics {
        let strategy =
            HeuristicRoutingStrategy::new(data.nb_of_stops(), direction, CostCalculator::default());
        let mut worker = RangeRaptorWorker::new(data, direction, 3, seeds, strategy);
        worker.route(&[0], &Deadline::new(None)).unwrap();
        worker.into_strategy().into_heuristics()
    }

    #[test]
    fn reverse_heuristic_counts_rides_toward_the_destination() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                })
                .trip("R1-2", |t| {
                    t.st("A", "10:05").st("B", "10:12");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("B", "10:20").st("C", "10:40");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let seeds = [AccessEgress::walking(stop("C"), 60, 200)];

        let heuristics = run(&data, SearchDirection::Reverse, &seeds);

        let at_c = heuristics.at(stop("C")).unwrap();
        assert_eq!(at_c.duration, 60);
        assert_eq!(at_c.number_of_transfers, 0);

        let at_b = heuristics.at(stop("B")).unwrap();
        assert_eq!(at_b.duration, 60 + 20 * 60);
        assert_eq!(at_b.number_of_transfers, 1);

        // the shortest ride between A and B is 7 minutes
        let at_a = heuristics.at(stop("A")).unwrap();
        assert_eq!(at_a.duration, 60 + 20 * 60 + 7 * 60);
        assert_eq!(at_a.number_of_transfers, 2);
        let calculator = CostCalculator::default();
        assert_eq!(
            at_a.cost,
            200 + 2 * calculator.board_cost() + 100 * (27 * 60)
        );

        let summary = heuristics.summary(&[AccessEgress::walking(stop("A"), 120, 0)]);
        assert!(summary.destination_reachable);
        assert_eq!(summary.best_overall_duration, 120 + 60 + 27 * 60);
        assert_eq!(summary.best_number_of_transfers, 1);
    }

    #[test]
    fn unknown_seed_stops_are_ignored() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let seeds = [
            AccessEgress::walking(data.nb_of_stops() + 3, 0, 0),
            AccessEgress::walking(stop("A"), 0, 0),
        ];

        let heuristics = run(&data, SearchDirection::Forward, &seeds);

        assert_eq!(heuristics.nb_of_reached_stops(), 2);
        assert!(heuristics.at(data.nb_of_stops() + 3).is_none());
        assert_eq!(heuristics.at(stop("B")).unwrap().duration, 10 * 60);
    }

    #[test]
    fn unreachable_stops_have_no_heuristic() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("C", "10:20").st("D", "10:40");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let seeds = [AccessEgress::walking(stop("A"), 0, 0)];

        let heuristics = run(&data, SearchDirection::Forward, &seeds);

        assert!(heuristics.is_reached(stop("B")));
        assert!(!heuristics.is_reached(stop("C")));
        assert_eq!(heuristics.at(stop("D")), None);
        assert_eq!(heuristics.nb_of_reached_stops(), 2);
        let summary = heuristics.summary(&[AccessEgress::walking(stop("D"), 0, 0)]);
        assert!(!summary.destination_reachable);
    }
}
