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

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use tracing::{trace, warn};

use super::heuristic::Heuristics;
use super::strategy::RoutingStrategy;
use crate::constrained_transfer::{
    ConstrainedBoardingSearch, ConstrainedTransferIndex, TransferConstraint,
};
use crate::cost::{Cost, CostCalculator};
use crate::pareto_front::{Dominance, ParetoFront};
use crate::path::{Path, PathLeg, TransferLeg, TransitLeg};
use crate::request::{AccessEgress, SearchRequest, SlackParams};
use crate::search_direction::SearchDirection;
use crate::time::Time;
use crate::transit_data::{Pattern, StopIdx, Timetable, Transfer, TransitDataProvider, TripSchedule};

pub type ArrivalIdx = usize;

/// A ride, with positions and times in the search sense (no slack included).
#[derive(Debug, Clone, Copy)]
pub struct TransitArrival<'data> {
    pub trip: &'data TripSchedule,
    pub board_stop: StopIdx,
    pub board_position: usize,
    pub alight_position: usize,
    pub board_time: Time,
    pub alight_time: Time,
    pub constraint: TransferConstraint,
}

#[derive(Debug, Clone, Copy)]
pub enum ArrivalKind<'data> {
    Access(AccessEgress),
    Transit(TransitArrival<'data>),
    Transfer { from_stop: StopIdx, duration: Time },
}

#[derive(Debug, Clone, Copy)]
pub struct StopArrival<'data> {
    pub stop: StopIdx,
    pub round: u8,
    pub iteration: usize,
    pub time: Time,
    pub cost: Cost,
    pub kind: ArrivalKind<'data>,
    pub previous: Option<ArrivalIdx>,
}

impl<'data> StopArrival<'data> {
    /// Arrived by riding : a transit leg or an on-board access.
    pub fn arrived_on_board(&self) -> bool {
        match &self.kind {
            ArrivalKind::Transit(_) => true,
            ArrivalKind::Access(access) => access.on_board,
            ArrivalKind::Transfer { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StopCriteria {
    time: Time,
    cost: Cost,
    on_board: bool,
}

// An arrival on board is never dominated by a walking one, since only
// the former can be followed by a walk.
impl Dominance<StopCriteria> for SearchDirection {
    fn dominates(&self, lower: &StopCriteria, upper: &StopCriteria) -> bool {
        self.is_before_or_equal(lower.time, upper.time)
            && lower.cost <= upper.cost
            && (lower.on_board || !upper.on_board)
    }
}

/// Criteria of a complete journey : time at the destination in the search sense,
/// number of transfers and generalized cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationCriteria {
    pub time: Time,
    pub nb_of_transfers: u8,
    pub cost: Cost,
}

impl Dominance<DestinationCriteria> for SearchDirection {
    fn dominates(&self, lower: &DestinationCriteria, upper: &DestinationCriteria) -> bool {
        self.is_before_or_equal(lower.time, upper.time)
            && lower.nb_of_transfers <= upper.nb_of_transfers
            && lower.cost <= upper.cost
    }
}

#[derive(Debug, Clone, Copy)]
struct DestinationArrival {
    arrival: ArrivalIdx,
    egress: AccessEgress,
}

#[derive(Debug, Clone, Copy)]
struct Boarded<'data> {
    previous: ArrivalIdx,
    trip: &'data TripSchedule,
    board_stop: StopIdx,
    board_position: usize,
    board_time: Time,
    // cost of the previous arrival and of the boarding
    board_cost: Cost,
    constraint: TransferConstraint,
}

#[derive(Debug, Clone, Copy)]
struct OnboardCriteria {
    trip_index: usize,
    // cost at the boarding minus the riding cost elapsed since the origin of times,
    // so that two trips ridden with the same reluctance can be compared
    relative_cost: Cost,
    transit_factor: i32,
}

impl Dominance<OnboardCriteria> for SearchDirection {
    fn dominates(&self, lower: &OnboardCriteria, upper: &OnboardCriteria) -> bool {
        let is_not_after = match self {
            SearchDirection::Forward => lower.trip_index <= upper.trip_index,
            SearchDirection::Reverse => lower.trip_index >= upper.trip_index,
        };
        lower.transit_factor == upper.transit_factor
            && is_not_after
            && lower.relative_cost <= upper.relative_cost
    }
}

/// Multi-criteria state of a Range-Raptor search over (time, cost),
/// producing a Pareto set of paths over (time, transfers, cost).
///
/// Arrivals are stored in an arena shared by all iterations and rounds,
/// each of them pointing to the arrival it comes from.
pub struct StdRoutingStrategy<'data> {
    direction: SearchDirection,
    calculator: CostCalculator,
    slacks: SlackParams,
    search_board_slack: Time,
    search_alight_slack: Time,
    minimum_transfer_time_is_definitive: bool,
    constrained_transfers: Option<&'data ConstrainedTransferIndex>,
    services: FixedBitSet,
    heuristics: Option<Arc<Heuristics>>,
    egress_at_stop: Vec<Vec<AccessEgress>>,

    nb_of_stops: usize,
    arrivals: Vec<StopArrival<'data>>,
    // one front per round and per stop
    fronts: Vec<ParetoFront<ArrivalIdx, StopCriteria>>,
    round: u8,
    iteration: usize,
    iteration_time: Time,

    touched_current_round: FixedBitSet,
    touched_previous_round: FixedBitSet,
    touched_by_transit: FixedBitSet,

    timetable: Option<&'data Timetable>,
    constrained_search: Option<ConstrainedBoardingSearch<'data>>,
    onboard: ParetoFront<Boarded<'data>, OnboardCriteria>,

    destination: ParetoFront<DestinationArrival, DestinationCriteria>,
}

impl<'data> StdRoutingStrategy<'data> {
    /// Only trips whose service is in `services` are boarded.
    pub fn new<Data: TransitDataProvider>(
        data: &'data Data,
        request: &SearchRequest,
        calculator: CostCalculator,
        services: FixedBitSet,
        heuristics: Option<Arc<Heuristics>>,
    ) -> Self {
        let direction = request.direction;
        let nb_of_stops = data.nb_of_stops();
        let nb_of_fronts = (usize::from(request.max_number_of_rounds()) + 1) * nb_of_stops;

        let mut egress_at_stop = vec![Vec::new(); nb_of_stops];
        for egress in request.search_egress() {
            if let Some(legs) = egress_at_stop.get_mut(egress.stop) {
                legs.push(*egress);
            }
        }

        let constrained_transfers = if request.enable_transfer_constraints {
            data.constrained_transfers()
        } else {
            None
        };

        Self {
            direction,
            calculator,
            slacks: request.slacks,
            search_board_slack: request.slacks.search_board_slack(direction),
            search_alight_slack: request.slacks.search_alight_slack(direction),
            minimum_transfer_time_is_definitive: request.minimum_transfer_time_is_definitive,
            constrained_transfers,
            services,
            heuristics,
            egress_at_stop,
            nb_of_stops,
            arrivals: Vec::new(),
            fronts: vec![ParetoFront::new(); nb_of_fronts],
            round: 0,
            iteration: 0,
            iteration_time: 0,
            touched_current_round: FixedBitSet::with_capacity(nb_of_stops),
            touched_previous_round: FixedBitSet::with_capacity(nb_of_stops),
            touched_by_transit: FixedBitSet::with_capacity(nb_of_stops),
            timetable: None,
            constrained_search: None,
            onboard: ParetoFront::new(),
            destination: ParetoFront::new(),
        }
    }

    pub fn nb_of_arrivals(&self) -> usize {
        self.arrivals.len()
    }

    pub fn nb_of_destination_arrivals(&self) -> usize {
        self.destination.len()
    }

    fn front_idx(&self, round: u8, stop: StopIdx) -> usize {
        usize::from(round) * self.nb_of_stops + stop
    }

    fn is_allowed(&self, trip: &TripSchedule) -> bool {
        self.services.contains(trip.service())
    }

    // - update `arrivals`, `fronts` and the touched stops
    // - reads `heuristics` and `destination`
    fn add_arrival(
        &mut self,
        stop: StopIdx,
        time: Time,
        cost: Cost,
        kind: ArrivalKind<'data>,
        previous: Option<ArrivalIdx>,
    ) -> bool {
        if stop >= self.nb_of_stops {
            return false;
        }
        let arrival = StopArrival {
            stop,
            round: self.round,
            iteration: self.iteration,
            time,
            cost,
            kind,
            previous,
        };
        let criteria = StopCriteria {
            time,
            cost,
            on_board: arrival.arrived_on_board(),
        };

        for round in 0..=self.round {
            let front = &self.fronts[self.front_idx(round, stop)];
            if front.dominates(&criteria, &self.direction) {
                return false;
            }
        }
        if self.is_pruned_by_heuristics(stop, time, cost) {
            return false;
        }

        let arrival_idx = self.arrivals.len();
        self.arrivals.push(arrival);
        let front_idx = self.front_idx(self.round, stop);
        self.fronts[front_idx].add_and_remove_elements_dominated(
            arrival_idx,
            criteria,
            &self.direction,
        );
        self.touched_current_round.insert(stop);
        if criteria.on_board {
            self.touched_by_transit.insert(stop);
        }
        true
    }

    // The arrival cannot lead to a journey better than the ones already found.
    fn is_pruned_by_heuristics(&self, stop: StopIdx, time: Time, cost: Cost) -> bool {
        let heuristics = match &self.heuristics {
            Some(heuristics) => heuristics,
            None => return false,
        };
        let at_stop = match heuristics.at(stop) {
            Some(at_stop) => at_stop,
            None => return true,
        };
        if self.destination.is_empty() {
            return false;
        }
        let optimistic = DestinationCriteria {
            time: self.direction.plus(time, at_stop.duration),
            nb_of_transfers: self
                .round
                .saturating_add(at_stop.number_of_transfers)
                .saturating_sub(1),
            cost: cost + at_stop.cost,
        };
        self.destination.dominates(&optimistic, &self.direction)
    }

    fn earliest_board_time(&self, arrival: &StopArrival) -> Time {
        let slack = if arrival.round == 0 {
            self.search_board_slack
        } else {
            self.search_board_slack + self.slacks.transfer_slack
        };
        self.direction.plus(arrival.time, slack)
    }

    // The ride that led to `arrival`, possibly followed by a walk.
    fn last_transit_arrival(&self, arrival_idx: ArrivalIdx) -> Option<(TransitArrival<'data>, StopIdx)> {
        let arrival = &self.arrivals[arrival_idx];
        match &arrival.kind {
            ArrivalKind::Transit(transit) => Some((*transit, arrival.stop)),
            ArrivalKind::Transfer { .. } => {
                let previous = &self.arrivals[arrival.previous?];
                match &previous.kind {
                    ArrivalKind::Transit(transit) => Some((*transit, previous.stop)),
                    _ => None,
                }
            }
            ArrivalKind::Access(_) => None,
        }
    }

    // - update `onboard`
    #[allow(clippy::too_many_arguments)]
    fn board(
        &mut self,
        previous: ArrivalIdx,
        trip_index: usize,
        trip: &'data TripSchedule,
        stop: StopIdx,
        position: usize,
        constraint: TransferConstraint,
        source_alight_time: Option<Time>,
    ) {
        let arrival = &self.arrivals[previous];
        let first_boarding = arrival.round == 0;
        let board_time = self.direction.board_time(trip, position);
        let prev_arrival_time = if first_boarding {
            self.direction.minus(board_time, self.search_board_slack)
        } else {
            match source_alight_time {
                Some(source_alight_time) if constraint.is_facilitated() => source_alight_time,
                _ => arrival.time,
            }
        };
        let board_cost = arrival.cost
            + self.calculator.boarding_cost(
                first_boarding,
                prev_arrival_time,
                stop,
                board_time,
                trip,
                constraint,
            );
        let transit_factor = self.calculator.transit_factor(trip);
        let criteria = OnboardCriteria {
            trip_index,
            relative_cost: board_cost - transit_factor * self.direction.plus(0, board_time),
            transit_factor,
        };
        let boarded = Boarded {
            previous,
            trip,
            board_stop: stop,
            board_position: position,
            board_time,
            board_cost,
            constraint,
        };
        self.onboard.add(boarded, criteria, &self.direction);
    }

    // - update `destination`
    // - reads the arrivals of the current round at the touched stops
    fn arrive_at_destination(&mut self) {
        for stop in self.touched_current_round.ones() {
            let egresses = &self.egress_at_stop[stop];
            if egresses.is_empty() {
                continue;
            }
            let front = &self.fronts[usize::from(self.round) * self.nb_of_stops + stop];
            for (arrival_idx, _) in front.iter() {
                let arrival = &self.arrivals[*arrival_idx];
                if arrival.iteration != self.iteration {
                    continue;
                }
                for egress in egresses {
                    // walking twice in a row is not allowed
                    if !egress.on_board && !arrival.arrived_on_board() {
                        continue;
                    }
                    let nb_of_rides = arrival.round.saturating_add(u8::from(egress.on_board));
                    let criteria = DestinationCriteria {
                        time: self.direction.plus(arrival.time, egress.duration),
                        nb_of_transfers: nb_of_rides.saturating_sub(1),
                        cost: arrival.cost + egress.cost,
                    };
                    let destination_arrival = DestinationArrival {
                        arrival: *arrival_idx,
                        egress: *egress,
                    };
                    if self
                        .destination
                        .add(destination_arrival, criteria, &self.direction)
                    {
                        trace!(
                            "New destination arrival at {} with {} transfers and cost {}",
                            criteria.time,
                            criteria.nb_of_transfers,
                            criteria.cost
                        );
                    }
                }
            }
        }
    }

    /// Paths toward every arrival of the destination Pareto set.
    pub fn into_paths(self) -> Vec<Path<'data>> {
        self.destination
            .iter()
            .filter_map(|(destination_arrival, _)| self.build_path(destination_arrival))
            .collect()
    }

    fn build_path(&self, destination_arrival: &DestinationArrival) -> Option<Path<'data>> {
        let mut search_legs = Vec::new();
        let mut idx = destination_arrival.arrival;
        let search_access = loop {
            let arrival = &self.arrivals[idx];
            match &arrival.kind {
                ArrivalKind::Access(access) => break *access,
                ArrivalKind::Transit(transit) => {
                    search_legs.push(self.real_transit_leg(transit, arrival.stop));
                }
                ArrivalKind::Transfer {
                    from_stop,
                    duration,
                } => {
                    let (from, to) = match self.direction {
                        SearchDirection::Forward => (*from_stop, arrival.stop),
                        SearchDirection::Reverse => (arrival.stop, *from_stop),
                    };
                    search_legs.push(PathLeg::Transfer(TransferLeg::new(from, to, *duration)));
                }
            }
            idx = match arrival.previous {
                Some(previous) => previous,
                None => {
                    warn!("An arrival chain does not start with an access leg. I skip it.");
                    return None;
                }
            };
        };
        let access_arrival = &self.arrivals[idx];
        let last_arrival = &self.arrivals[destination_arrival.arrival];

        // `search_legs` goes from the search egress to the search access
        let (access, mut legs, egress, departure) = match self.direction {
            SearchDirection::Forward => {
                search_legs.reverse();
                (
                    search_access,
                    search_legs,
                    destination_arrival.egress,
                    access_arrival.time - search_access.duration,
                )
            }
            SearchDirection::Reverse => (
                destination_arrival.egress,
                search_legs,
                search_access,
                last_arrival.time - destination_arrival.egress.duration,
            ),
        };

        if !self.direction.is_forward() {
            // a reverse boarding is a real alighting : the constraint found with it
            // belongs to the next trip boarded by the traveler
            let mut constraint = TransferConstraint::Regular;
            for leg in legs.iter_mut() {
                if let PathLeg::Transit(transit) = leg {
                    std::mem::swap(&mut transit.constraint, &mut constraint);
                }
            }
        }

        Some(Path::new(
            access,
            legs,
            egress,
            &self.slacks,
            &self.calculator,
            departure,
        ))
    }

    fn real_transit_leg(&self, transit: &TransitArrival<'data>, alight_stop: StopIdx) -> PathLeg<'data> {
        let leg = match self.direction {
            SearchDirection::Forward => TransitLeg {
                trip: transit.trip,
                board_position: transit.board_position,
                alight_position: transit.alight_position,
                board_stop: transit.board_stop,
                alight_stop,
                constraint: transit.constraint,
            },
            SearchDirection::Reverse => TransitLeg {
                trip: transit.trip,
                board_position: transit.alight_position,
                alight_position: transit.board_position,
                board_stop: alight_stop,
                alight_stop: transit.board_stop,
                constraint: transit.constraint,
            },
        };
        PathLeg::Transit(leg)
    }
}

impl<'data> RoutingStrategy<'data> for StdRoutingStrategy<'data> {
    type Arrival = ArrivalIdx;

    fn setup_iteration(&mut self, iteration_time: Time) {
        self.iteration += 1;
        self.iteration_time = iteration_time;
        self.round = 0;
        self.touched_current_round.clear();
        self.touched_previous_round.clear();
        self.touched_by_transit.clear();
    }

    fn set_access_to_stop(&mut self, access: &AccessEgress, iteration_time: Time) {
        debug_assert!(!access.on_board);
        let time = self.direction.plus(iteration_time, access.duration);
        self.add_arrival(access.stop, time, access.cost, ArrivalKind::Access(*access), None);
    }

    fn set_on_board_access_to_stop(&mut self, access: &AccessEgress, iteration_time: Time) {
        debug_assert!(access.on_board);
        debug_assert!(self.round == 1);
        let time = self.direction.plus(iteration_time, access.duration);
        self.add_arrival(access.stop, time, access.cost, ArrivalKind::Access(*access), None);
    }

    fn prepare_for_next_round(&mut self, round: u8) -> bool {
        if round == 1 {
            // on-board egress right after the access
            self.arrive_at_destination();
        }
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
        self.timetable = Some(timetable);
        self.onboard.clear();
        let direction = self.direction;
        let definitive = self.minimum_transfer_time_is_definitive;
        self.constrained_search = self
            .constrained_transfers
            .map(|index| index.boarding_search(direction, pattern.idx(), definitive));
    }

    fn alight(&mut self, stop: StopIdx, position: usize) {
        if self.onboard.is_empty() {
            return;
        }
        let onboard = std::mem::take(&mut self.onboard);
        for (boarded, _) in onboard.iter() {
            let alight_time = self.direction.alight_time(boarded.trip, position);
            let time = self.direction.plus(alight_time, self.search_alight_slack);
            let transit_time = self.direction.duration(boarded.board_time, alight_time);
            let cost = self.calculator.transit_arrival_cost(
                boarded.board_cost,
                self.search_alight_slack,
                transit_time,
                boarded.trip,
                stop,
            );
            let transit = TransitArrival {
                trip: boarded.trip,
                board_stop: boarded.board_stop,
                board_position: boarded.board_position,
                alight_position: position,
                board_time: boarded.board_time,
                alight_time,
                constraint: boarded.constraint,
            };
            self.add_arrival(
                stop,
                time,
                cost,
                ArrivalKind::Transit(transit),
                Some(boarded.previous),
            );
        }
        self.onboard = onboard;
    }

    fn boardings_at(&self, stop: StopIdx, arrivals: &mut Vec<ArrivalIdx>) {
        debug_assert!(self.round >= 1);
        let front = &self.fronts[self.front_idx(self.round - 1, stop)];
        arrivals.extend(
            front
                .iter()
                .map(|(arrival_idx, _)| *arrival_idx)
                .filter(|arrival_idx| self.arrivals[*arrival_idx].iteration == self.iteration),
        );
    }

    fn board_with_constrained_transfer(
        &mut self,
        arrival_idx: ArrivalIdx,
        stop: StopIdx,
        position: usize,
    ) -> bool {
        let (search, timetable) = match (&self.constrained_search, self.timetable) {
            (Some(search), Some(timetable)) => (search, timetable),
            _ => return false,
        };
        if !search.transfer_exist(position) {
            return false;
        }
        let (source, source_stop) = match self.last_transit_arrival(arrival_idx) {
            Some(source) => source,
            None => return false,
        };
        let arrival = &self.arrivals[arrival_idx];
        let walk_duration = match arrival.kind {
            ArrivalKind::Transfer { duration, .. } => duration,
            _ => 0,
        };
        let earliest_board_time = self.earliest_board_time(arrival);
        let boarding = search.find(
            timetable,
            source.trip,
            source_stop,
            source.alight_position,
            source.alight_time,
            walk_duration,
            earliest_board_time,
            position,
            &|trip: &TripSchedule| self.is_allowed(trip),
        );
        match boarding {
            None => false,
            Some(boarding) if boarding.constraint.is_not_allowed() => true,
            Some(boarding) => {
                self.board(
                    arrival_idx,
                    boarding.trip_index,
                    boarding.trip,
                    stop,
                    position,
                    boarding.constraint,
                    Some(source.alight_time),
                );
                true
            }
        }
    }

    fn board_with_regular_transfer(&mut self, arrival_idx: ArrivalIdx, stop: StopIdx, position: usize) {
        let timetable = match self.timetable {
            Some(timetable) => timetable,
            None => return,
        };
        let earliest_board_time = self.earliest_board_time(&self.arrivals[arrival_idx]);
        let found = self.direction.best_trip_to_board(
            timetable,
            earliest_board_time,
            position,
            &|trip: &TripSchedule| self.is_allowed(trip),
        );
        if let Some((trip_index, trip)) = found {
            self.board(
                arrival_idx,
                trip_index,
                trip,
                stop,
                position,
                TransferConstraint::Regular,
                None,
            );
        }
    }

    fn transfer_to_stops(&mut self, from_stop: StopIdx, transfers: &'data [Transfer]) {
        let front = &self.fronts[self.front_idx(self.round, from_stop)];
        let from_arrivals: Vec<ArrivalIdx> = front
            .iter()
            .map(|(arrival_idx, _)| *arrival_idx)
            .filter(|arrival_idx| {
                let arrival = &self.arrivals[*arrival_idx];
                arrival.iteration == self.iteration && arrival.arrived_on_board()
            })
            .collect();

        for arrival_idx in from_arrivals {
            let arrival = self.arrivals[arrival_idx];
            for transfer in transfers {
                let to_stop = self.direction.transfer_target(transfer);
                if to_stop == from_stop {
                    continue;
                }
                let time = self.direction.plus(arrival.time, transfer.duration);
                let cost = arrival.cost + self.calculator.walk_cost(transfer.duration);
                let kind = ArrivalKind::Transfer {
                    from_stop,
                    duration: transfer.duration,
                };
                self.add_arrival(to_stop, time, cost, kind, Some(arrival_idx));
            }
        }
    }

    fn round_complete(&mut self) {
        self.arrive_at_destination();
    }

    fn iteration_complete(&mut self) {
        trace!(
            "Iteration {} at {} : {} arrivals, {} destination arrivals",
            self.iteration,
            self.iteration_time,
            self.arrivals.len(),
            self.destination.len()
        );
    }
}
