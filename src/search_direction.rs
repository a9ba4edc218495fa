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

use itertools::Either;
use serde::{Deserialize, Serialize};

use crate::time::{Time, UNREACHED};
use crate::transit_data::{
    Pattern, StopIdx, Timetable, Transfer, TransitDataProvider, TripSchedule,
};

/// Direction in which the rounds propagate.
///
/// `Forward` answers "depart after" requests : time flows from the origin toward the destination.
/// `Reverse` answers "arrive before" requests : the search starts at the destination
/// and goes back in time, boarding a trip at the stop where the traveler
/// actually alights from it.
///
/// All the "search-sense" vocabulary of the engine (board, alight, before, after, access, egress)
/// is translated to real time through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    Forward,
    Reverse,
}

impl Default for SearchDirection {
    fn default() -> Self {
        SearchDirection::Forward
    }
}

impl SearchDirection {
    pub fn is_forward(&self) -> bool {
        matches!(self, SearchDirection::Forward)
    }

    pub fn opposite(&self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }

    /// Is `time` strictly better than `other` in the search sense ?
    pub fn is_before(&self, time: Time, other: Time) -> bool {
        match self {
            SearchDirection::Forward => time < other,
            SearchDirection::Reverse => time > other,
        }
    }

    pub fn is_before_or_equal(&self, time: Time, other: Time) -> bool {
        time == other || self.is_before(time, other)
    }

    pub fn plus(&self, time: Time, duration: Time) -> Time {
        match self {
            SearchDirection::Forward => time + duration,
            SearchDirection::Reverse => time - duration,
        }
    }

    pub fn minus(&self, time: Time, duration: Time) -> Time {
        self.plus(time, -duration)
    }

    /// Positive duration elapsed when going from `from` to `to` in the search sense.
    pub fn duration(&self, from: Time, to: Time) -> Time {
        match self {
            SearchDirection::Forward => to - from,
            SearchDirection::Reverse => from - to,
        }
    }

    /// The best of the two times in the search sense
    pub fn best(&self, time: Time, other: Time) -> Time {
        if self.is_before(other, time) {
            other
        } else {
            time
        }
    }

    /// The worst of the two times in the search sense
    pub fn worst(&self, time: Time, other: Time) -> Time {
        if self.is_before(other, time) {
            time
        } else {
            other
        }
    }

    pub fn unreached_time(&self) -> Time {
        match self {
            SearchDirection::Forward => UNREACHED,
            SearchDirection::Reverse => -UNREACHED,
        }
    }

    /// Time at which the search "boards" `trip` at `position`.
    /// In reverse this is the real arrival time, since the trip is ridden backward.
    pub fn board_time(&self, trip: &TripSchedule, position: usize) -> Time {
        match self {
            SearchDirection::Forward => trip.departure(position),
            SearchDirection::Reverse => trip.arrival(position),
        }
    }

    pub fn alight_time(&self, trip: &TripSchedule, position: usize) -> Time {
        match self {
            SearchDirection::Forward => trip.arrival(position),
            SearchDirection::Reverse => trip.departure(position),
        }
    }

    pub fn can_board(&self, pattern: &Pattern, position: usize) -> bool {
        match self {
            SearchDirection::Forward => pattern.can_board(position),
            SearchDirection::Reverse => pattern.can_debark(position),
        }
    }

    pub fn can_alight(&self, pattern: &Pattern, position: usize) -> bool {
        match self {
            SearchDirection::Forward => pattern.can_debark(position),
            SearchDirection::Reverse => pattern.can_board(position),
        }
    }

    /// Is `upstream` visited before `downstream` when riding in the search sense ?
    pub fn is_upstream(&self, upstream: usize, downstream: usize) -> bool {
        match self {
            SearchDirection::Forward => upstream < downstream,
            SearchDirection::Reverse => upstream > downstream,
        }
    }

    /// Positions of a pattern, from `first` to the end of the ride in the search sense.
    pub fn positions_from(
        &self,
        first: usize,
        nb_of_positions: usize,
    ) -> impl Iterator<Item = usize> {
        match self {
            SearchDirection::Forward => Either::Left(first..nb_of_positions),
            SearchDirection::Reverse => Either::Right((0..=first).rev()),
        }
    }

    /// Trip indexes of a timetable, earliest trip first in the search sense.
    pub fn trip_indexes(&self, nb_of_trips: usize) -> impl Iterator<Item = usize> {
        match self {
            SearchDirection::Forward => Either::Left(0..nb_of_trips),
            SearchDirection::Reverse => Either::Right((0..nb_of_trips).rev()),
        }
    }

    /// The first trip, in the search sense, among those accepted by `filter`
    /// which can be boarded at `position` when waiting from `waiting_time`.
    pub fn best_trip_to_board<'data, Filter>(
        &self,
        timetable: &'data Timetable,
        waiting_time: Time,
        position: usize,
        filter: &Filter,
    ) -> Option<(usize, &'data TripSchedule)>
    where
        Filter: Fn(&TripSchedule) -> bool,
    {
        let trip_index = match self {
            SearchDirection::Forward => {
                timetable.earliest_filtered_trip_to_board(waiting_time, position, filter)
            }
            SearchDirection::Reverse => {
                timetable.latest_filtered_trip_that_debark(waiting_time, position, filter)
            }
        }?;
        Some((trip_index, timetable.trip(trip_index)))
    }

    pub fn transfers<'data, Data: TransitDataProvider>(
        &self,
        data: &'data Data,
        stop: StopIdx,
    ) -> &'data [Transfer] {
        match self {
            SearchDirection::Forward => data.transfers_from(stop),
            SearchDirection::Reverse => data.transfers_to(stop),
        }
    }

    /// The stop reached when walking `transfer` in the search sense.
    pub fn transfer_target(&self, transfer: &Transfer) -> StopIdx {
        match self {
            SearchDirection::Forward => transfer.to_stop,
            SearchDirection::Reverse => transfer.from_stop,
        }
    }
}
