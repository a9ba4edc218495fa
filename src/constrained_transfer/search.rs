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

use super::index::{TransferForPattern, TransfersForPattern};
use super::TransferConstraint;
use crate::search_direction::SearchDirection;
use crate::time::Time;
use crate::transit_data::{StationIdx, StopIdx, Timetable, TripSchedule};

/// When no constrained transfer applies to the first trips that can be boarded,
/// we give up and let the regular trip search do its job.
pub const ABORT_SEARCH_AFTER_N_VALID_NORMAL_TRIPS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct ConstrainedBoarding<'data> {
    pub trip_index: usize,
    pub trip: &'data TripSchedule,
    pub position: usize,
    pub time: Time,
    pub constraint: TransferConstraint,
}

/// Finds the trip to board at a position of a pattern, after arriving with a source trip,
/// when constrained transfers toward this position exist.
///
/// Works for both directions : in a reverse search the "source" trip is the one
/// ridden after the transfer, and the trip returned is the one ridden before it.
pub struct ConstrainedBoardingSearch<'data> {
    direction: SearchDirection,
    transfers: &'data TransfersForPattern,
    stations: &'data [Option<StationIdx>],
    minimum_transfer_time_is_definitive: bool,
}

impl<'data> ConstrainedBoardingSearch<'data> {
    pub fn new(
        direction: SearchDirection,
        transfers: &'data TransfersForPattern,
        stations: &'data [Option<StationIdx>],
        minimum_transfer_time_is_definitive: bool,
    ) -> Self {
        Self {
            direction,
            transfers,
            stations,
            minimum_transfer_time_is_definitive,
        }
    }

    pub fn transfer_exist(&self, position: usize) -> bool {
        self.transfers.transfer_exist(position)
    }

    /// Search `timetable` for a trip to board at `position`.
    ///
    /// - `source_trip` was left at `source_position`, on `source_stop`,
    ///   at `prev_transit_arrival_time` (no slack included)
    /// - `walk_duration` is the walk from `source_stop` to the boarding stop, 0 when they are the same
    /// - `earliest_board_time` is the time at which a regular transfer would be possible
    ///
    /// Returns `None` when no constrained transfer applies, in which case
    /// a regular trip search should be performed.
    /// A returned boarding with a `NotAllowed` constraint means that boarding
    /// this pattern here is forbidden.
    #[allow(clippy::too_many_arguments)]
    pub fn find<Filter>(
        &self,
        timetable: &'data Timetable,
        source_trip: &TripSchedule,
        source_stop: StopIdx,
        source_position: usize,
        prev_transit_arrival_time: Time,
        walk_duration: Time,
        earliest_board_time: Time,
        position: usize,
        filter: &Filter,
    ) -> Option<ConstrainedBoarding<'data>>
    where
        Filter: Fn(&TripSchedule) -> bool,
    {
        let source_station = self.stations.get(source_stop).copied().flatten();
        let candidates: Vec<&TransferForPattern> = self
            .transfers
            .at(position)
            .iter()
            .filter(|transfer| {
                transfer.source_point().matches(
                    source_trip,
                    source_position,
                    source_stop,
                    source_station,
                )
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let direction = self.direction;
        let is_eligible = |time: Time, bound: Time| !direction.is_before(time, bound);
        // guaranteed and stay-seated transfers still need the traveler at the boarding stop
        let arrival_at_stop = direction.plus(prev_transit_arrival_time, walk_duration);

        let mut nb_of_valid_trips = 0;
        let mut use_next_normal_trip = false;

        for trip_index in direction.trip_indexes(timetable.nb_of_trips()) {
            let trip = timetable.trip(trip_index);
            let time = direction.board_time(trip, position);

            if direction.is_before(time, prev_transit_arrival_time) || !filter(trip) {
                continue;
            }
            nb_of_valid_trips += 1;

            let boarding = |constraint: TransferConstraint| ConstrainedBoarding {
                trip_index,
                trip,
                position,
                time,
                constraint,
            };

            // the first (most specific) transfer applying to this trip decides
            let decisive = candidates.iter().find(|transfer| transfer.applies_to(trip));

            match decisive.map(|transfer| (transfer, transfer.constraint())) {
                Some((transfer, TransferConstraint::NotAllowed)) => {
                    if transfer.applies_to_all_target_trips() {
                        return Some(boarding(TransferConstraint::NotAllowed));
                    }
                    use_next_normal_trip = true;
                }
                Some((_, TransferConstraint::Guaranteed)) => {
                    if is_eligible(time, arrival_at_stop) {
                        return Some(boarding(TransferConstraint::Guaranteed));
                    }
                }
                Some((_, TransferConstraint::StaySeated)) => {
                    if is_eligible(time, arrival_at_stop) {
                        return Some(boarding(TransferConstraint::StaySeated));
                    }
                }
                Some((_, TransferConstraint::MinTransferTime(min_time))) => {
                    let with_min_time = direction.plus(prev_transit_arrival_time, min_time);
                    let bound = if self.minimum_transfer_time_is_definitive {
                        with_min_time
                    } else {
                        direction.worst(with_min_time, earliest_board_time)
                    };
                    if is_eligible(time, bound) {
                        return Some(boarding(TransferConstraint::MinTransferTime(min_time)));
                    }
                }
                Some((_, TransferConstraint::Regular)) => {
                    if is_eligible(time, earliest_board_time) {
                        return Some(boarding(TransferConstraint::Regular));
                    }
                }
                None => {
                    if use_next_normal_trip && is_eligible(time, earliest_board_time) {
                        return Some(boarding(TransferConstraint::Regular));
                    }
                }
            }

            if nb_of_valid_trips >= ABORT_SEARCH_AFTER_N_VALID_NORMAL_TRIPS {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained_transfer::TransferConstraint::*;
    use crate::search_direction::SearchDirection::{Forward, Reverse};
    use crate::transit_data::builder::{
        route_stop, station, stop, trip_pos, TransferPointName, TransitDataBuilder,
    };
    use crate::transit_data::{TransitData, TransitDataProvider};

    // 2 minutes of slack on each side of a transfer
    const ALIGHT_BOARD_SLACK: Time = 120;

    //                     A      B      C      D
    // R1-1              10:00  10:10  10:20
    // R1-2              10:05  10:15  10:25
    // R2-1                     10:15  10:30  10:40
    // R2-2                     10:20  10:35  10:45
    // ...
    // R2-6                     10:40  10:55  11:05
    //
    // The transfer R1-2 -> R2-1 at B has no connection time at all,
    // R2-2 is the regular fallback in forward, and R1-1 in reverse.
    fn data(transfers: Vec<(TransferPointName, TransferPointName, TransferConstraint)>) -> TransitData {
        let mut builder = TransitDataBuilder::default()
            .station("SB", &["B"])
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10").st("C", "10:20");
                })
                .trip("R1-2", |t| {
                    t.st("A", "10:05").st("B", "10:15").st("C", "10:25");
                });
            })
            .route("R2", |r| {
                let mut r = r;
                for nb in 0..6_i32 {
                    let minutes = 5 * nb;
                    r = r.trip(&format!("R2-{}", nb + 1), |t| {
                        t.st("B", 10 * 3600 + (15 + minutes) * 60)
                            .st("C", 10 * 3600 + (30 + minutes) * 60)
                            .st("D", 10 * 3600 + (40 + minutes) * 60);
                    });
                }
            });
        for (from, to, constraint) in transfers {
            builder = builder.constrained_transfer(from, to, constraint);
        }
        builder.build()
    }

    fn position_of(data: &TransitData, trip: &TripSchedule, stop: StopIdx) -> usize {
        data.pattern(trip.pattern())
            .stops()
            .iter()
            .position(|pattern_stop| *pattern_stop == stop)
            .unwrap()
    }

    // the boarded trip id and constraint
    fn search(
        data: &TransitData,
        direction: SearchDirection,
        stop_name: &str,
        definitive: bool,
    ) -> Option<(String, TransferConstraint)> {
        let stop = data.stop_idx(stop_name).unwrap();
        let (source, target) = match direction {
            Forward => (data.trip("R1-2").unwrap(), data.trip("R2-1").unwrap()),
            Reverse => (data.trip("R2-1").unwrap(), data.trip("R1-2").unwrap()),
        };
        let source_position = position_of(data, source, stop);
        let target_position = position_of(data, target, stop);
        let prev_transit_arrival_time = direction.alight_time(source, source_position);
        let earliest_board_time = match direction {
            Forward => prev_transit_arrival_time + ALIGHT_BOARD_SLACK,
            Reverse => prev_transit_arrival_time - 2 * ALIGHT_BOARD_SLACK,
        };

        let index = data.constrained_transfers().unwrap();
        let subject = index.boarding_search(direction, target.pattern(), definitive);
        assert!(subject.transfer_exist(target_position));

        let boarding = subject.find(
            data.timetable(target.pattern()),
            source,
            stop,
            source_position,
            prev_transit_arrival_time,
            0,
            earliest_board_time,
            target_position,
            &|_: &TripSchedule| true,
        )?;
        assert_eq!(boarding.position, target_position);
        assert_eq!(boarding.trip.trip_index(), boarding.trip_index);
        Some((boarding.trip.id().to_string(), boarding.constraint))
    }

    fn assert_search(
        transfers: Vec<(TransferPointName, TransferPointName, TransferConstraint)>,
        stop: &str,
        expected_forward: Option<(&str, TransferConstraint)>,
        expected_reverse: Option<(&str, TransferConstraint)>,
    ) {
        let data = data(transfers);
        let to_owned = |expected: Option<(&str, TransferConstraint)>| {
            expected.map(|(trip, constraint)| (trip.to_string(), constraint))
        };
        assert_eq!(search(&data, Forward, stop, false), to_owned(expected_forward));
        assert_eq!(search(&data, Reverse, stop, false), to_owned(expected_reverse));
    }

    #[test]
    fn guaranteed_transfer_with_zero_connection_time() {
        let points = vec![
            (stop("B"), stop("B")),
            (station("SB"), station("SB")),
            (route_stop("R1", "B"), route_stop("R2", "B")),
            (trip_pos("R1-2", 1), trip_pos("R2-1", 0)),
        ];
        for (from, to) in points {
            assert_search(
                vec![(from, to, Guaranteed)],
                "B",
                Some(("R2-1", Guaranteed)),
                Some(("R1-2", Guaranteed)),
            );
        }
    }

    #[test]
    fn most_specific_transfer_wins() {
        assert_search(
            vec![
                (stop("B"), trip_pos("R2-1", 0), NotAllowed),
                (trip_pos("R1-2", 1), stop("B"), Guaranteed),
                (route_stop("R1", "B"), stop("B"), NotAllowed),
            ],
            "B",
            Some(("R2-1", Guaranteed)),
            Some(("R1-2", Guaranteed)),
        );
    }

    #[test]
    fn next_trip_is_used_when_transfer_to_first_trip_is_not_allowed() {
        assert_search(
            vec![(trip_pos("R1-2", 2), trip_pos("R2-1", 1), NotAllowed)],
            "C",
            Some(("R2-2", Regular)),
            Some(("R1-1", Regular)),
        );
    }

    #[test]
    fn not_allowed_for_all_trips_blocks_the_transfer() {
        assert_search(
            vec![(stop("C"), stop("C"), NotAllowed)],
            "C",
            Some(("R2-1", NotAllowed)),
            Some(("R1-2", NotAllowed)),
        );
    }

    #[test]
    fn search_is_aborted_after_five_normal_trips() {
        assert_search(
            vec![(trip_pos("R1-2", 2), trip_pos("R2-6", 1), Guaranteed)],
            "C",
            None,
            None,
        );
    }

    #[test]
    fn minimum_transfer_time() {
        assert_search(
            vec![(stop("C"), stop("C"), MinTransferTime(600))],
            "C",
            Some(("R2-2", MinTransferTime(600))),
            Some(("R1-1", MinTransferTime(600))),
        );
    }

    #[test]
    fn definitive_minimum_transfer_time_ignores_slacks() {
        let data = data(vec![(stop("B"), stop("B"), MinTransferTime(0))]);
        assert_eq!(
            search(&data, Forward, "B", true),
            Some(("R2-1".to_string(), MinTransferTime(0)))
        );
        assert_eq!(
            search(&data, Reverse, "B", true),
            Some(("R1-2".to_string(), MinTransferTime(0)))
        );
        // not definitive : the regular slacks still apply
        assert_eq!(
            search(&data, Forward, "B", false),
            Some(("R2-2".to_string(), MinTransferTime(0)))
        );
    }

    #[test]
    fn regular_search_misses_the_tight_connection() {
        let data = data(Vec::new());
        let source = data.trip("R1-2").unwrap();
        let target = data.trip("R2-1").unwrap();
        let earliest = source.arrival(1) + ALIGHT_BOARD_SLACK;
        let (_, trip) = Forward
            .best_trip_to_board(data.timetable(target.pattern()), earliest, 0, &|_: &TripSchedule| {
                true
            })
            .unwrap();
        assert_eq!(trip.id(), "R2-2");
        assert!(data.constrained_transfers().is_none());
    }

    #[test]
    fn filtered_trips_are_skipped() {
        let data = data(vec![(stop("B"), stop("B"), Guaranteed)]);
        let source = data.trip("R1-2").unwrap();
        let target = data.trip("R2-1").unwrap();
        let stop = data.stop_idx("B").unwrap();
        let index = data.constrained_transfers().unwrap();
        let subject = index.boarding_search(Forward, target.pattern(), false);
        let boarding = subject
            .find(
                data.timetable(target.pattern()),
                source,
                stop,
                1,
                source.arrival(1),
                0,
                source.arrival(1) + ALIGHT_BOARD_SLACK,
                0,
                &|trip: &TripSchedule| trip.id() != "R2-1",
            )
            .unwrap();
        assert_eq!(boarding.trip.id(), "R2-2");
        assert_eq!(boarding.constraint, Guaranteed);
    }

    #[test]
    fn guaranteed_transfer_waits_for_the_walk() {
        // R1-2 reaches B at 10:15, then a 20 minutes walk leads to C at 10:35
        let data = data(vec![(trip_pos("R1-2", 1), route_stop("R2", "C"), Guaranteed)]);
        let source = data.trip("R1-2").unwrap();
        let target = data.trip("R2-1").unwrap();
        let stop_b = data.stop_idx("B").unwrap();
        let walk_duration = 20 * 60;
        let index = data.constrained_transfers().unwrap();
        let subject = index.boarding_search(Forward, target.pattern(), false);
        let find = |walk_duration: Time| {
            subject
                .find(
                    data.timetable(target.pattern()),
                    source,
                    stop_b,
                    1,
                    source.arrival(1),
                    walk_duration,
                    source.arrival(1) + walk_duration + ALIGHT_BOARD_SLACK,
                    1,
                    &|_: &TripSchedule| true,
                )
                .map(|boarding| (boarding.trip.id().to_string(), boarding.constraint))
        };

        // R2-1 leaves C at 10:30, before the traveler gets there
        assert_eq!(find(walk_duration), Some(("R2-2".to_string(), Guaranteed)));
        assert_eq!(find(0), Some(("R2-1".to_string(), Guaranteed)));
    }
}
