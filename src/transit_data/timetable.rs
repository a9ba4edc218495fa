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

use std::cmp::Ordering::{Greater, Less};

use super::{PatternIdx, TripSchedule};
use crate::time::Time;

/// Trips of one pattern, sorted so that at every position
/// a trip departs (and arrives) no earlier than the trips before it.
#[derive(Debug, Clone)]
pub struct Timetable {
    pattern: PatternIdx,
    trips: Vec<TripSchedule>,
    board_times_by_position: Vec<Vec<Time>>,
    debark_times_by_position: Vec<Vec<Time>>,
}

/// A single representative trip of a pattern, whose offsets are lower bounds
/// of the ride and dwell times of every trip in the timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicTrip {
    pub(crate) arrival_offsets: Vec<Time>,
    pub(crate) departure_offsets: Vec<Time>,
    pub(crate) transit_reluctance_index: usize,
}

impl HeuristicTrip {
    pub fn arrival_offset(&self, position: usize) -> Time {
        self.arrival_offsets[position]
    }

    pub fn departure_offset(&self, position: usize) -> Time {
        self.departure_offsets[position]
    }

    pub fn transit_reluctance_index(&self) -> usize {
        self.transit_reluctance_index
    }
}

impl Timetable {
    pub(crate) fn new(pattern: PatternIdx, nb_of_positions: usize) -> Self {
        assert!(nb_of_positions >= 2);
        Self {
            pattern,
            trips: Vec::new(),
            board_times_by_position: vec![Vec::new(); nb_of_positions],
            debark_times_by_position: vec![Vec::new(); nb_of_positions],
        }
    }

    pub fn pattern(&self) -> PatternIdx {
        self.pattern
    }

    pub fn nb_of_positions(&self) -> usize {
        self.board_times_by_position.len()
    }

    pub fn nb_of_trips(&self) -> usize {
        self.trips.len()
    }

    pub fn trip(&self, trip_index: usize) -> &TripSchedule {
        &self.trips[trip_index]
    }

    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }

    pub fn departure_time(&self, trip_index: usize, position: usize) -> Time {
        self.board_times_by_position[position][trip_index]
    }

    pub fn arrival_time(&self, trip_index: usize, position: usize) -> Time {
        self.debark_times_by_position[position][trip_index]
    }

    // If we are waiting to board a trip at `position` at time `waiting_time`
    // return `Some(best_trip_idx)`
    // where `best_trip_idx` is the idx of the first trip that can be boarded
    //  after waiting_time
    pub fn earliest_trip_to_board(&self, waiting_time: Time, position: usize) -> Option<usize> {
        let board_times = &self.board_times_by_position[position];
        let last_board_time = board_times.last()?;
        if waiting_time > *last_board_time {
            return None;
        }

        let first_boardable_trip = if waiting_time <= board_times[0] {
            0
        } else {
            // We are looking for the smallest index in board_times
            // such that board_times[idx] >= waiting_time.
            // Since the comparator never returns Equal, binary_search_by
            // always returns Err(idx) with board_times[idx] >= waiting_time
            // and board_times[idx-1] < waiting_time
            board_times
                .binary_search_by(|time| if *time < waiting_time { Less } else { Greater })
                .unwrap_err()
        };

        Some(first_boardable_trip)
    }

    pub fn earliest_filtered_trip_to_board<Filter>(
        &self,
        waiting_time: Time,
        position: usize,
        filter: &Filter,
    ) -> Option<usize>
    where
        Filter: Fn(&TripSchedule) -> bool,
    {
        let first_boardable_trip = self.earliest_trip_to_board(waiting_time, position)?;

        (first_boardable_trip..self.nb_of_trips()).find(|trip_index| filter(&self.trips[*trip_index]))
    }

    // Given a `position` and a `time`
    // return `Some(trip_index)`
    // where `trip_index` is the idx of the trip, among those accepted by `filter`,
    // that debarks at `position` at the latest time no later than `waiting_time`
    pub fn latest_filtered_trip_that_debark<Filter>(
        &self,
        waiting_time: Time,
        position: usize,
        filter: &Filter,
    ) -> Option<usize>
    where
        Filter: Fn(&TripSchedule) -> bool,
    {
        let debark_times = &self.debark_times_by_position[position];
        let first_debark_time = debark_times.first()?;
        if waiting_time < *first_debark_time {
            return None;
        }

        // We are looking for the greatest index in debark_times
        // such that debark_times[idx] <= waiting_time.
        // binary_search_by gives Err(idx) with debark_times[idx] > waiting_time
        // and debark_times[idx-1] <= waiting_time
        let after_last_debarkable_trip = debark_times
            .binary_search_by(|time| if *time <= waiting_time { Less } else { Greater })
            .unwrap_err();

        (0..after_last_debarkable_trip)
            .rev()
            .find(|trip_index| filter(&self.trips[*trip_index]))
    }

    /// Representative trip used by the heuristic search.
    ///
    /// Each segment ride time and each dwell time is the minimum over all trips,
    /// so a ride on the heuristic trip is never longer than the same ride on a real trip.
    pub fn heuristic_trip(&self) -> HeuristicTrip {
        let nb_of_positions = self.nb_of_positions();
        let min_over_trips = |f: &dyn Fn(&TripSchedule) -> Time| -> Time {
            self.trips.iter().map(|trip| f(trip)).min().unwrap_or(0)
        };

        let mut arrival_offsets = Vec::with_capacity(nb_of_positions);
        let mut departure_offsets = Vec::with_capacity(nb_of_positions);
        arrival_offsets.push(0);
        departure_offsets.push(min_over_trips(&|trip: &TripSchedule| trip.departure(0) - trip.arrival(0)));
        for position in 1..nb_of_positions {
            let ride = min_over_trips(&|trip: &TripSchedule| trip.arrival(position) - trip.departure(position - 1));
            let arrival = departure_offsets[position - 1] + ride;
            let dwell = min_over_trips(&|trip: &TripSchedule| trip.departure(position) - trip.arrival(position));
            arrival_offsets.push(arrival);
            departure_offsets.push(arrival + dwell);
        }
        let transit_reluctance_index = self
            .trips
            .first()
            .map(|trip| trip.transit_reluctance_index)
            .unwrap_or(0);
        HeuristicTrip {
            arrival_offsets,
            departure_offsets,
            transit_reluctance_index,
        }
    }

    // Try to insert the trip in this timetable.
    // Gives the trip back if it would overtake (or be overtaken by) another trip.
    pub(crate) fn try_insert(&mut self, trip: TripSchedule) -> Result<(), TripSchedule> {
        assert!(trip.nb_of_positions() == self.nb_of_positions());
        match self.find_insert_idx(&trip) {
            Some(insert_idx) => {
                self.do_insert(trip, insert_idx);
                Ok(())
            }
            None => Err(trip),
        }
    }

    fn find_insert_idx(&self, trip: &TripSchedule) -> Option<usize> {
        let first_board_time = trip.departure(0);
        // insert after the trips departing at the same time
        let insert_idx = self.board_times_by_position[0].partition_point(|time| *time <= first_board_time);

        if insert_idx > 0 && !self.is_upper_or_equal(trip, insert_idx - 1) {
            return None;
        }
        if insert_idx < self.nb_of_trips() && !self.is_lower_or_equal(trip, insert_idx) {
            return None;
        }
        Some(insert_idx)
    }

    // is `trip` at least as late as trip `trip_index` at every position ?
    fn is_upper_or_equal(&self, trip: &TripSchedule, trip_index: usize) -> bool {
        (0..self.nb_of_positions()).all(|position| {
            trip.departure(position) >= self.departure_time(trip_index, position)
                && trip.arrival(position) >= self.arrival_time(trip_index, position)
        })
    }

    // is `trip` at most as late as trip `trip_index` at every position ?
    fn is_lower_or_equal(&self, trip: &TripSchedule, trip_index: usize) -> bool {
        (0..self.nb_of_positions()).all(|position| {
            trip.departure(position) <= self.departure_time(trip_index, position)
                && trip.arrival(position) <= self.arrival_time(trip_index, position)
        })
    }

    fn do_insert(&mut self, trip: TripSchedule, insert_idx: usize) {
        for position in 0..self.nb_of_positions() {
            self.board_times_by_position[position].insert(insert_idx, trip.departure(position));
            self.debark_times_by_position[position].insert(insert_idx, trip.arrival(position));
        }
        self.trips.insert(insert_idx, trip);
    }

    // Once all trips are inserted, let each trip know its pattern and its index
    pub(crate) fn finalize(&mut self, pattern: PatternIdx) {
        self.pattern = pattern;
        for (trip_index, trip) in self.trips.iter_mut().enumerate() {
            trip.trip_index = trip_index;
            trip.pattern = pattern;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(idx: usize, times: &[(Time, Time)]) -> TripSchedule {
        TripSchedule {
            idx,
            id: format!("trip_{}", idx),
            pattern: 0,
            route: 0,
            service: 0,
            trip_index: 0,
            transit_reluctance_index: 0,
            arrivals: times.iter().map(|(arrival, _)| *arrival).collect(),
            departures: times.iter().map(|(_, departure)| *departure).collect(),
        }
    }

    fn timetable() -> Timetable {
        let mut timetable = Timetable::new(0, 3);
        timetable
            .try_insert(trip(1, &[(200, 200), (300, 310), (400, 400)]))
            .unwrap();
        timetable
            .try_insert(trip(0, &[(100, 100), (200, 210), (290, 290)]))
            .unwrap();
        timetable
            .try_insert(trip(2, &[(300, 300), (400, 400), (500, 500)]))
            .unwrap();
        timetable.finalize(0);
        timetable
    }

    #[test]
    fn trips_are_sorted_on_insertion() {
        let timetable = timetable();
        let ids: Vec<_> = timetable.trips().iter().map(|trip| trip.idx()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(timetable.trip(2).trip_index(), 2);
        assert_eq!(timetable.departure_time(1, 1), 310);
    }

    #[test]
    fn overtaking_trip_is_rejected() {
        let mut timetable = timetable();
        // departs between trip 0 and trip 1 but arrives after trip 1
        let overtaking = trip(3, &[(150, 150), (350, 350), (450, 450)]);
        assert!(timetable.try_insert(overtaking).is_err());
    }

    #[test]
    fn earliest_trip_to_board() {
        let timetable = timetable();
        assert_eq!(timetable.earliest_trip_to_board(0, 1), Some(0));
        assert_eq!(timetable.earliest_trip_to_board(210, 1), Some(0));
        assert_eq!(timetable.earliest_trip_to_board(211, 1), Some(1));
        assert_eq!(timetable.earliest_trip_to_board(401, 1), None);

        let skip_trip_1 = |trip: &TripSchedule| trip.idx() != 1;
        assert_eq!(
            timetable.earliest_filtered_trip_to_board(211, 1, &skip_trip_1),
            Some(2)
        );
    }

    #[test]
    fn latest_trip_that_debark() {
        let timetable = timetable();
        let all = |_: &TripSchedule| true;
        assert_eq!(timetable.latest_filtered_trip_that_debark(299, 1, &all), Some(0));
        assert_eq!(timetable.latest_filtered_trip_that_debark(300, 1, &all), Some(1));
        assert_eq!(timetable.latest_filtered_trip_that_debark(1000, 1, &all), Some(2));
        assert_eq!(timetable.latest_filtered_trip_that_debark(199, 1, &all), None);

        let skip_trip_1 = |trip: &TripSchedule| trip.idx() != 1;
        assert_eq!(
            timetable.latest_filtered_trip_that_debark(399, 1, &skip_trip_1),
            Some(0)
        );
    }

    #[test]
    fn heuristic_trip_is_a_lower_bound() {
        let timetable = timetable();
        let heuristic_trip = timetable.heuristic_trip();
        // segment 0 -> 1 : min(100, 100, 100), dwell at 1 : min(10, 10, 0)
        assert_eq!(heuristic_trip.arrival_offset(1), 100);
        assert_eq!(heuristic_trip.departure_offset(1), 100);
        // segment 1 -> 2 : min(80, 90, 100)
        assert_eq!(heuristic_trip.arrival_offset(2), 180);
        for trip in timetable.trips() {
            for board in 0..2 {
                for alight in board + 1..3 {
                    let real = trip.arrival(alight) - trip.departure(board);
                    let heuristic = heuristic_trip.arrival_offset(alight)
                        - heuristic_trip.departure_offset(board);
                    assert!(heuristic <= real);
                }
            }
        }
    }
}
