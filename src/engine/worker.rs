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

use tracing::trace;

use super::strategy::RoutingStrategy;
use crate::error::RaptorError;
use crate::request::{AccessEgress, Deadline};
use crate::search_direction::SearchDirection;
use crate::time::Time;
use crate::transit_data::{PatternIdx, StopIdx, TransitDataProvider};

/// Runs the Range-Raptor rounds, and lets a `RoutingStrategy` decide
/// what an arrival, a boarding or a transfer means.
pub struct RangeRaptorWorker<'data, Data, Strategy>
where
    Strategy: RoutingStrategy<'data>,
{
    data: &'data Data,
    direction: SearchDirection,
    max_number_of_rounds: u8,
    access: Vec<AccessEgress>,

    strategy: Strategy,

    // the first position, in the search sense, at which a pattern has to be scanned
    first_position_of_pattern: Vec<Option<usize>>,
    patterns_to_scan: Vec<PatternIdx>,
    stops_to_transfer_from: Vec<StopIdx>,
    boardings: Vec<Strategy::Arrival>,

    nb_of_rounds: u8,
}

impl<'data, Data, Strategy> RangeRaptorWorker<'data, Data, Strategy>
where
    Data: TransitDataProvider,
    Strategy: RoutingStrategy<'data>,
{
    /// `access` are the legs where the search starts, in the search sense.
    pub fn new(
        data: &'data Data,
        direction: SearchDirection,
        max_number_of_rounds: u8,
        access: &[AccessEgress],
        strategy: Strategy,
    ) -> Self {
        Self {
            data,
            direction,
            max_number_of_rounds,
            access: access.to_vec(),
            strategy,
            first_position_of_pattern: vec![None; data.nb_of_patterns()],
            patterns_to_scan: Vec::new(),
            stops_to_transfer_from: Vec::new(),
            boardings: Vec::new(),
            nb_of_rounds: 0,
        }
    }

    /// Run one Range-Raptor iteration per element of `iteration_times`, in this order.
    pub fn route(&mut self, iteration_times: &[Time], deadline: &Deadline) -> Result<(), RaptorError> {
        for iteration_time in iteration_times {
            deadline.check("routing")?;
            self.run_iteration(*iteration_time);
        }
        Ok(())
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn into_strategy(self) -> Strategy {
        self.strategy
    }

    /// Highest number of rounds performed by an iteration
    pub fn nb_of_rounds(&self) -> u8 {
        self.nb_of_rounds
    }

    fn run_iteration(&mut self, iteration_time: Time) {
        self.strategy.setup_iteration(iteration_time);

        let has_on_board_access = self.access.iter().any(|access| access.on_board);
        for access in self.access.iter().filter(|access| !access.on_board) {
            self.strategy.set_access_to_stop(access, iteration_time);
        }

        let mut round = 1;
        while round <= self.max_number_of_rounds {
            let has_new_arrivals = self.strategy.prepare_for_next_round(round);
            if !has_new_arrivals && !(round == 1 && has_on_board_access) {
                break;
            }

            self.find_transit_for_round();

            if round == 1 {
                for access in self.access.iter().filter(|access| access.on_board) {
                    self.strategy
                        .set_on_board_access_to_stop(access, iteration_time);
                }
            }

            self.find_transfers_for_round();

            self.strategy.round_complete();
            self.nb_of_rounds = self.nb_of_rounds.max(round);
            round += 1;
        }

        trace!("Iteration at {} done in {} rounds", iteration_time, round - 1);
        self.strategy.iteration_complete();
    }

    // - update `patterns_to_scan` and `first_position_of_pattern`
    // - reads the stops touched in the previous round
    fn identify_patterns_to_scan(&mut self) {
        debug_assert!(self.patterns_to_scan.is_empty());
        let data = self.data;
        let direction = self.direction;
        for stop in self.strategy.stops_touched_previous_round().ones() {
            for (pattern, position) in data.patterns_at(stop) {
                match &mut self.first_position_of_pattern[*pattern] {
                    Some(first) => {
                        if direction.is_upstream(*position, *first) {
                            *first = *position;
                        }
                    }
                    none => {
                        *none = Some(*position);
                        self.patterns_to_scan.push(*pattern);
                    }
                }
            }
        }
    }

    fn find_transit_for_round(&mut self) {
        self.identify_patterns_to_scan();

        let patterns_to_scan = std::mem::take(&mut self.patterns_to_scan);
        for pattern in patterns_to_scan.iter() {
            let first_position = self.first_position_of_pattern[*pattern].take();
            if let Some(first_position) = first_position {
                self.scan_pattern(*pattern, first_position);
            }
        }
        self.patterns_to_scan = patterns_to_scan;
        self.patterns_to_scan.clear();
    }

    // Along the pattern, alight before boarding : a trip boarded at a position
    // cannot be left at the same position.
    fn scan_pattern(&mut self, pattern_idx: PatternIdx, first_position: usize) {
        let data = self.data;
        let direction = self.direction;
        let pattern = data.pattern(pattern_idx);
        let timetable = data.timetable(pattern_idx);
        if timetable.nb_of_trips() == 0 {
            return;
        }
        self.strategy.prepare_for_transit_with(pattern, timetable);

        let mut boardings = std::mem::take(&mut self.boardings);
        for position in direction.positions_from(first_position, pattern.nb_of_positions()) {
            let stop = pattern.stop(position);

            if direction.can_alight(pattern, position) {
                self.strategy.alight(stop, position);
            }

            if direction.can_board(pattern, position)
                && self.strategy.stops_touched_previous_round().contains(stop)
            {
                self.strategy.boardings_at(stop, &mut boardings);
                for arrival in boardings.drain(..) {
                    let handled = self
                        .strategy
                        .board_with_constrained_transfer(arrival, stop, position);
                    if !handled {
                        self.strategy
                            .board_with_regular_transfer(arrival, stop, position);
                    }
                }
            }
        }
        self.boardings = boardings;
    }

    fn find_transfers_for_round(&mut self) {
        let data = self.data;
        let direction = self.direction;

        let mut stops = std::mem::take(&mut self.stops_to_transfer_from);
        stops.clear();
        stops.extend(self.strategy.stops_touched_by_transit_current_round().ones());
        for stop in stops.iter() {
            let transfers = direction.transfers(data, *stop);
            self.strategy.transfer_to_stops(*stop, transfers);
        }
        self.stops_to_transfer_from = stops;
    }
}
