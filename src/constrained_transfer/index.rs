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
use std::collections::HashMap;
use tracing::debug;

use super::search::ConstrainedBoardingSearch;
use super::{ConstrainedTransfer, TransferConstraint, TransferPoint};
use crate::search_direction::SearchDirection;
use crate::transit_data::{
    Pattern, PatternIdx, StationIdx, StopIdx, Timetable, TripIdx, TripSchedule,
};

/// A constrained transfer seen from one position of a target pattern.
#[derive(Debug, Clone)]
pub struct TransferForPattern {
    transfer_id: usize,
    source_point: TransferPoint,
    target_trip: Option<TripIdx>,
    constraint: TransferConstraint,
    specificity: u8,
}

impl TransferForPattern {
    pub fn source_point(&self) -> &TransferPoint {
        &self.source_point
    }

    pub fn constraint(&self) -> TransferConstraint {
        self.constraint
    }

    pub fn specificity(&self) -> u8 {
        self.specificity
    }

    pub fn applies_to_all_target_trips(&self) -> bool {
        self.target_trip.is_none()
    }

    pub fn applies_to(&self, trip: &TripSchedule) -> bool {
        match self.target_trip {
            Some(target_trip) => target_trip == trip.idx(),
            None => true,
        }
    }
}

/// Constrained transfers of one pattern, by stop position.
/// At each position, the most specific transfers come first.
#[derive(Debug, Clone)]
pub struct TransfersForPattern {
    by_position: Vec<Vec<TransferForPattern>>,
    exist: FixedBitSet,
}

impl TransfersForPattern {
    fn new(nb_of_positions: usize) -> Self {
        Self {
            by_position: vec![Vec::new(); nb_of_positions],
            exist: FixedBitSet::with_capacity(nb_of_positions),
        }
    }

    fn add(&mut self, position: usize, transfer: TransferForPattern) {
        self.by_position[position].push(transfer);
        self.exist.insert(position);
    }

    fn finalize(&mut self) {
        for transfers in self.by_position.iter_mut() {
            // stable sort : among equally specific transfers, the first declared wins
            transfers.sort_by(|lhs, rhs| rhs.specificity.cmp(&lhs.specificity));
            let mut seen = Vec::with_capacity(transfers.len());
            transfers.retain(|transfer| {
                if seen.contains(&transfer.transfer_id) {
                    false
                } else {
                    seen.push(transfer.transfer_id);
                    true
                }
            });
        }
    }

    pub fn transfer_exist(&self, position: usize) -> bool {
        self.exist.contains(position)
    }

    /// Some trip of the pattern may be boarded at `position` without leaving the previous one.
    pub fn stay_seated_exist(&self, position: usize) -> bool {
        self.transfer_exist(position)
            && self
                .at(position)
                .iter()
                .any(|transfer| transfer.constraint.is_stay_seated())
    }

    pub fn at(&self, position: usize) -> &[TransferForPattern] {
        self.by_position
            .get(position)
            .map(|transfers| transfers.as_slice())
            .unwrap_or(&[])
    }
}

/// Constrained transfers, indexed by the pattern and stop position where they end a search step.
///
/// - `forward` is keyed by the *to* side of each transfer, at positions where boarding is possible.
/// - `reverse` is keyed by the *from* side, at positions where debarking is possible.
#[derive(Debug, Clone)]
pub struct ConstrainedTransferIndex {
    transfers: Vec<ConstrainedTransfer>,
    forward: Vec<TransfersForPattern>,
    reverse: Vec<TransfersForPattern>,
    stations: Vec<Option<StationIdx>>,
}

impl ConstrainedTransferIndex {
    /// `stations[stop]` is the station of `stop`
    pub fn new(
        transfers: Vec<ConstrainedTransfer>,
        patterns: &[Pattern],
        timetables: &[Timetable],
        stations: Vec<Option<StationIdx>>,
    ) -> Self {
        let generator = TransferIndexGenerator::new(patterns, timetables, &stations);
        let (forward, reverse) = generator.generate(&transfers);
        debug!(
            "Constrained transfers index built with {} transfers over {} patterns",
            transfers.len(),
            patterns.len()
        );
        Self {
            transfers,
            forward,
            reverse,
            stations,
        }
    }

    pub fn transfers(&self) -> &[ConstrainedTransfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn station_of(&self, stop: StopIdx) -> Option<StationIdx> {
        self.stations.get(stop).copied().flatten()
    }

    /// Transfers ending a search step on `pattern`, in the sense of `direction`.
    pub fn transfers_for_pattern(
        &self,
        direction: SearchDirection,
        pattern: PatternIdx,
    ) -> &TransfersForPattern {
        match direction {
            SearchDirection::Forward => &self.forward[pattern],
            SearchDirection::Reverse => &self.reverse[pattern],
        }
    }

    pub fn boarding_search(
        &self,
        direction: SearchDirection,
        pattern: PatternIdx,
        minimum_transfer_time_is_definitive: bool,
    ) -> ConstrainedBoardingSearch<'_> {
        ConstrainedBoardingSearch::new(
            direction,
            self.transfers_for_pattern(direction, pattern),
            &self.stations,
            minimum_transfer_time_is_definitive,
        )
    }

    /// The most specific constraint applying when alighting `from_trip` at `from_position`
    /// (the stop `from_stop`), and then boarding `to_trip` at `to_position`.
    pub fn find_constraint(
        &self,
        from_trip: &TripSchedule,
        from_position: usize,
        from_stop: StopIdx,
        to_trip: &TripSchedule,
        to_position: usize,
    ) -> Option<TransferConstraint> {
        let from_station = self.station_of(from_stop);
        self.forward
            .get(to_trip.pattern())?
            .at(to_position)
            .iter()
            .find(|transfer| {
                transfer.applies_to(to_trip)
                    && transfer
                        .source_point
                        .matches(from_trip, from_position, from_stop, from_station)
            })
            .map(|transfer| transfer.constraint)
    }
}

struct TransferIndexGenerator<'a> {
    patterns: &'a [Pattern],
    stations: &'a [Option<StationIdx>],
    pattern_of_trip: HashMap<TripIdx, PatternIdx>,
}

impl<'a> TransferIndexGenerator<'a> {
    fn new(
        patterns: &'a [Pattern],
        timetables: &[Timetable],
        stations: &'a [Option<StationIdx>],
    ) -> Self {
        let pattern_of_trip = timetables
            .iter()
            .flat_map(|timetable| {
                timetable
                    .trips()
                    .iter()
                    .map(move |trip| (trip.idx(), timetable.pattern()))
            })
            .collect();
        Self {
            patterns,
            stations,
            pattern_of_trip,
        }
    }

    fn generate(
        &self,
        transfers: &[ConstrainedTransfer],
    ) -> (Vec<TransfersForPattern>, Vec<TransfersForPattern>) {
        let new_index = || -> Vec<TransfersForPattern> {
            self.patterns
                .iter()
                .map(|pattern| TransfersForPattern::new(pattern.nb_of_positions()))
                .collect()
        };
        let mut forward = new_index();
        let mut reverse = new_index();

        for (transfer_id, transfer) in transfers.iter().enumerate() {
            let specificity = transfer.specificity_ranking();

            for (pattern, position, target_trip) in self.expand(&transfer.to) {
                if !self.patterns[pattern].can_board(position) {
                    continue;
                }
                forward[pattern].add(
                    position,
                    TransferForPattern {
                        transfer_id,
                        source_point: transfer.from.clone(),
                        target_trip,
                        constraint: transfer.constraint,
                        specificity,
                    },
                );
            }

            for (pattern, position, target_trip) in self.expand(&transfer.from) {
                if !self.patterns[pattern].can_debark(position) {
                    continue;
                }
                reverse[pattern].add(
                    position,
                    TransferForPattern {
                        transfer_id,
                        source_point: transfer.to.clone(),
                        target_trip,
                        constraint: transfer.constraint,
                        specificity,
                    },
                );
            }
        }

        for transfers_for_pattern in forward.iter_mut().chain(reverse.iter_mut()) {
            transfers_for_pattern.finalize();
        }
        (forward, reverse)
    }

    // all (pattern, position, trip) designated by `point`
    fn expand(&self, point: &TransferPoint) -> Vec<(PatternIdx, usize, Option<TripIdx>)> {
        match point {
            TransferPoint::Stop(stop) => self.positions_where(|_, pattern_stop| pattern_stop == *stop),
            TransferPoint::Station(station) => self.positions_where(|_, pattern_stop| {
                self.stations.get(pattern_stop).copied().flatten() == Some(*station)
            }),
            TransferPoint::RouteStop { route, stop } => {
                self.positions_where(|pattern, pattern_stop| {
                    pattern.route() == *route && pattern_stop == *stop
                })
            }
            TransferPoint::Trip {
                trip,
                stop_position,
            } => match self.pattern_of_trip.get(trip) {
                Some(pattern) if *stop_position < self.patterns[*pattern].nb_of_positions() => {
                    vec![(*pattern, *stop_position, Some(*trip))]
                }
                _ => Vec::new(),
            },
            TransferPoint::Composite(composite) => composite
                .points()
                .iter()
                .flat_map(|member| self.expand(member))
                .collect(),
        }
    }

    fn positions_where<Predicate>(
        &self,
        predicate: Predicate,
    ) -> Vec<(PatternIdx, usize, Option<TripIdx>)>
    where
        Predicate: Fn(&Pattern, StopIdx) -> bool,
    {
        let mut result = Vec::new();
        for pattern in self.patterns {
            for (position, stop) in pattern.stops().iter().enumerate() {
                if predicate(pattern, *stop) {
                    result.push((pattern.idx(), position, None));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained_transfer::TransferConstraint::*;
    use crate::transit_data::builder::{route_stop, station, stop, trip_pos, TransitDataBuilder};
    use crate::transit_data::{TransitData, TransitDataProvider};

    fn data() -> TransitData {
        TransitDataBuilder::default()
            .station("SB", &["B"])
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10").st("C", "10:20");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("B", "10:15").st("C", "10:30").st("D", "10:40");
                });
            })
            .constrained_transfer(stop("B"), stop("B"), Guaranteed)
            .constrained_transfer(route_stop("R1", "B"), station("SB"), NotAllowed)
            .constrained_transfer(trip_pos("R1-1", 1), trip_pos("R2-1", 0), StaySeated)
            .build()
    }

    #[test]
    fn transfers_are_indexed_on_the_boarding_side() {
        let data = data();
        let index = data.constrained_transfers().unwrap();
        let r1 = data.trip("R1-1").unwrap().pattern();
        let r2 = data.trip("R2-1").unwrap().pattern();

        let forward = index.transfers_for_pattern(SearchDirection::Forward, r2);
        assert!(forward.transfer_exist(0));
        assert!(!forward.transfer_exist(1));
        // most specific first
        let specificities: Vec<u8> = forward.at(0).iter().map(|t| t.specificity()).collect();
        assert_eq!(specificities, vec![33, 21, 0]);

        // nobody boards R1 at B from a transfer in a forward search
        let forward_r1 = index.transfers_for_pattern(SearchDirection::Forward, r1);
        assert!(forward_r1.transfer_exist(1));
        assert!(!forward_r1.transfer_exist(0));

        let reverse = index.transfers_for_pattern(SearchDirection::Reverse, r1);
        assert!(reverse.transfer_exist(1));
        assert_eq!(reverse.at(1).len(), 3);
        // debarking is not possible at the first position of R2
        let reverse_r2 = index.transfers_for_pattern(SearchDirection::Reverse, r2);
        assert!(!reverse_r2.transfer_exist(0));
    }

    #[test]
    fn find_constraint_returns_the_most_specific() {
        let data = data();
        let index = data.constrained_transfers().unwrap();
        let r1 = data.trip("R1-1").unwrap();
        let r2 = data.trip("R2-1").unwrap();
        let b = data.stop_idx("B").unwrap();
        assert_eq!(index.find_constraint(r1, 1, b, r2, 0), Some(StaySeated));
        assert_eq!(index.find_constraint(r1, 1, b, r2, 1), None);
    }
}
