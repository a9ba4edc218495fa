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

pub mod builder;
mod timetable;

pub use timetable::{HeuristicTrip, Timetable};

use chrono::NaiveDate;
use fixedbitset::FixedBitSet;
use std::collections::{BTreeSet, HashMap};

use crate::constrained_transfer::ConstrainedTransferIndex;
use crate::time::{format_time_short, Time};

pub type StopIdx = usize;
pub type StationIdx = usize;
pub type RouteIdx = usize;
pub type PatternIdx = usize;
pub type TripIdx = usize;
pub type ServiceIdx = usize;

/// Everything the engine needs to know about the public transit network.
///
/// All references handed out by an implementor must stay valid,
/// and unchanged, for the whole duration of a search.
pub trait TransitDataProvider: Sync {
    fn nb_of_stops(&self) -> usize;

    fn nb_of_patterns(&self) -> usize;

    /// Panics if `pattern` is not a valid pattern index
    fn pattern(&self, pattern: PatternIdx) -> &Pattern;

    /// Panics if `pattern` is not a valid pattern index
    fn timetable(&self, pattern: PatternIdx) -> &Timetable;

    /// Patterns going through `stop`, along with the position of `stop` in each of them.
    fn patterns_at(&self, stop: StopIdx) -> &[(PatternIdx, usize)];

    /// Walking transfers leaving `stop`
    fn transfers_from(&self, stop: StopIdx) -> &[Transfer];

    /// Walking transfers arriving at `stop`
    fn transfers_to(&self, stop: StopIdx) -> &[Transfer];

    fn station_of(&self, stop: StopIdx) -> Option<StationIdx>;

    fn stop_name(&self, stop: StopIdx) -> &str;

    fn stop_idx(&self, name: &str) -> Option<StopIdx>;

    fn route_name(&self, route: RouteIdx) -> &str;

    /// `None` when the network has no constrained transfer at all.
    fn constrained_transfers(&self) -> Option<&ConstrainedTransferIndex>;

    /// Bitset, indexed by service, of the services running on `date`.
    fn active_services(&self, date: NaiveDate) -> FixedBitSet;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    BoardAndDebark,
    BoardOnly,
    DebarkOnly,
    NoBoardDebark,
}

impl Default for FlowDirection {
    fn default() -> Self {
        FlowDirection::BoardAndDebark
    }
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub name: String,
    pub station: Option<StationIdx>,
}

#[derive(Debug, Clone)]
pub struct Station {
    pub name: String,
    pub stops: Vec<StopIdx>,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub transit_reluctance_index: usize,
}

/// An ordered sequence of stops, with boarding/debarking restrictions,
/// shared by all the trips of one timetable.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) idx: PatternIdx,
    pub(crate) route: RouteIdx,
    pub(crate) stops: Vec<StopIdx>,
    pub(crate) flows: Vec<FlowDirection>,
}

impl Pattern {
    pub fn idx(&self) -> PatternIdx {
        self.idx
    }

    pub fn route(&self) -> RouteIdx {
        self.route
    }

    pub fn nb_of_positions(&self) -> usize {
        self.stops.len()
    }

    /// Panics if `position` is out of the pattern
    pub fn stop(&self, position: usize) -> StopIdx {
        self.stops[position]
    }

    pub fn stops(&self) -> &[StopIdx] {
        &self.stops
    }

    pub fn can_board(&self, position: usize) -> bool {
        // nobody boards at the last position
        position + 1 < self.stops.len()
            && matches!(
                self.flows[position],
                FlowDirection::BoardAndDebark | FlowDirection::BoardOnly
            )
    }

    pub fn can_debark(&self, position: usize) -> bool {
        position > 0
            && matches!(
                self.flows[position],
                FlowDirection::BoardAndDebark | FlowDirection::DebarkOnly
            )
    }
}

/// One trip along a pattern.
///
/// `arrivals[pos]` and `departures[pos]` are the times at the stop at `pos` in the pattern.
#[derive(Debug, Clone)]
pub struct TripSchedule {
    pub(crate) idx: TripIdx,
    pub(crate) id: String,
    pub(crate) pattern: PatternIdx,
    pub(crate) route: RouteIdx,
    pub(crate) service: ServiceIdx,
    pub(crate) trip_index: usize,
    pub(crate) transit_reluctance_index: usize,
    pub(crate) arrivals: Vec<Time>,
    pub(crate) departures: Vec<Time>,
}

impl TripSchedule {
    pub fn idx(&self) -> TripIdx {
        self.idx
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pattern(&self) -> PatternIdx {
        self.pattern
    }

    pub fn route(&self) -> RouteIdx {
        self.route
    }

    pub fn service(&self) -> ServiceIdx {
        self.service
    }

    /// Index of this trip in the timetable of its pattern
    pub fn trip_index(&self) -> usize {
        self.trip_index
    }

    pub fn transit_reluctance_index(&self) -> usize {
        self.transit_reluctance_index
    }

    pub fn arrival(&self, position: usize) -> Time {
        self.arrivals[position]
    }

    pub fn departure(&self, position: usize) -> Time {
        self.departures[position]
    }

    pub fn nb_of_positions(&self) -> usize {
        self.departures.len()
    }

    /// Is this the same trip, in the same timetable ?
    pub fn is_same(&self, other: &TripSchedule) -> bool {
        self.idx == other.idx
    }
}

impl std::fmt::Display for TripSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.id,
            format_time_short(self.departures.first().copied().unwrap_or_default())
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from_stop: StopIdx,
    pub to_stop: StopIdx,
    pub duration: Time,
}

#[derive(Debug, Clone)]
pub struct ServiceCalendar {
    pub id: String,
    pub dates: BTreeSet<NaiveDate>,
}

/// In-memory implementation of `TransitDataProvider`,
/// usually created through `builder::TransitDataBuilder`.
#[derive(Debug)]
pub struct TransitData {
    pub(crate) stops: Vec<Stop>,
    pub(crate) stations: Vec<Station>,
    pub(crate) routes: Vec<Route>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) timetables: Vec<Timetable>,
    pub(crate) patterns_by_stop: Vec<Vec<(PatternIdx, usize)>>,
    pub(crate) transfers_from: Vec<Vec<Transfer>>,
    pub(crate) transfers_to: Vec<Vec<Transfer>>,
    pub(crate) services: Vec<ServiceCalendar>,
    pub(crate) stop_by_name: HashMap<String, StopIdx>,
    pub(crate) trip_by_id: HashMap<String, (PatternIdx, usize)>,
    pub(crate) constrained_transfers: Option<ConstrainedTransferIndex>,
}

impl TransitData {
    pub fn trip(&self, id: &str) -> Option<&TripSchedule> {
        let (pattern, trip_index) = self.trip_by_id.get(id)?;
        Some(self.timetables[*pattern].trip(*trip_index))
    }

    pub fn nb_of_trips(&self) -> usize {
        self.trip_by_id.len()
    }

    pub fn station_idx(&self, name: &str) -> Option<StationIdx> {
        self.stations.iter().position(|station| station.name == name)
    }

    pub fn route_idx(&self, name: &str) -> Option<RouteIdx> {
        self.routes.iter().position(|route| route.name == name)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }
}

impl TransitDataProvider for TransitData {
    fn nb_of_stops(&self) -> usize {
        self.stops.len()
    }

    fn nb_of_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn pattern(&self, pattern: PatternIdx) -> &Pattern {
        &self.patterns[pattern]
    }

    fn timetable(&self, pattern: PatternIdx) -> &Timetable {
        &self.timetables[pattern]
    }

    fn patterns_at(&self, stop: StopIdx) -> &[(PatternIdx, usize)] {
        &self.patterns_by_stop[stop]
    }

    fn transfers_from(&self, stop: StopIdx) -> &[Transfer] {
        &self.transfers_from[stop]
    }

    fn transfers_to(&self, stop: StopIdx) -> &[Transfer] {
        &self.transfers_to[stop]
    }

    fn station_of(&self, stop: StopIdx) -> Option<StationIdx> {
        self.stops[stop].station
    }

    fn stop_name(&self, stop: StopIdx) -> &str {
        &self.stops[stop].name
    }

    fn stop_idx(&self, name: &str) -> Option<StopIdx> {
        self.stop_by_name.get(name).copied()
    }

    fn route_name(&self, route: RouteIdx) -> &str {
        &self.routes[route].name
    }

    fn constrained_transfers(&self) -> Option<&ConstrainedTransferIndex> {
        self.constrained_transfers.as_ref()
    }

    fn active_services(&self, date: NaiveDate) -> FixedBitSet {
        let mut active = FixedBitSet::with_capacity(self.services.len());
        for (idx, service) in self.services.iter().enumerate() {
            if service.dates.contains(&date) {
                active.insert(idx);
            }
        }
        active
    }
}
