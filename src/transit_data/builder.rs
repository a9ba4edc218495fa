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

//! Builder used to easily create a `TransitData`.
//!
//! ```
//! # use raptor::transit_data::builder::{stop, TransitDataBuilder};
//! # use raptor::constrained_transfer::TransferConstraint;
//! let data = TransitDataBuilder::default()
//!     .route("R1", |r| {
//!         r.trip("R1-1", |t| {
//!             t.st("A", "10:00").st("B", "10:10");
//!         });
//!     })
//!     .route("R2", |r| {
//!         r.trip("R2-1", |t| {
//!             t.st("B", "10:10").st("C", "10:20");
//!         });
//!     })
//!     .transfer("B", "B", "00:01:00")
//!     .constrained_transfer(stop("B"), stop("B"), TransferConstraint::Guaranteed)
//!     .build();
//! # assert_eq!(data.nb_of_trips(), 2);
//! ```
//!
//! Malformed input (unknown names, invalid times or dates, trips with less than 2 stops)
//! makes the builder panic.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::{
    FlowDirection, Pattern, PatternIdx, Route, RouteIdx, ServiceCalendar, Station, StationIdx,
    Stop, StopIdx, Timetable, Transfer, TransitData, TripSchedule,
};
use crate::constrained_transfer::{
    CompositeTransferPoint, ConstrainedTransfer, ConstrainedTransferIndex, TransferConstraint,
    TransferPoint,
};
use crate::time::{parse_time, Time};

pub const DEFAULT_CALENDAR_ID: &str = "default_service";
pub const DEFAULT_DATE: &str = "2020-01-01";

/// A transfer point designated by names, resolved when the data is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPointName {
    Stop(String),
    Station(String),
    RouteStop { route: String, stop: String },
    Trip { trip: String, stop_position: usize },
    Any(Vec<TransferPointName>),
}

pub fn stop(name: &str) -> TransferPointName {
    TransferPointName::Stop(name.to_string())
}

pub fn station(name: &str) -> TransferPointName {
    TransferPointName::Station(name.to_string())
}

pub fn route_stop(route: &str, stop: &str) -> TransferPointName {
    TransferPointName::RouteStop {
        route: route.to_string(),
        stop: stop.to_string(),
    }
}

pub fn trip_pos(trip: &str, stop_position: usize) -> TransferPointName {
    TransferPointName::Trip {
        trip: trip.to_string(),
        stop_position,
    }
}

pub fn any(points: Vec<TransferPointName>) -> TransferPointName {
    TransferPointName::Any(points)
}

pub trait IntoTime {
    fn into_time(&self) -> Time;
}

impl IntoTime for Time {
    fn into_time(&self) -> Time {
        *self
    }
}

impl IntoTime for &str {
    // Note: if the string is not in the right format, this conversion will fail
    fn into_time(&self) -> Time {
        parse_time(self).unwrap_or_else(|err| panic!("invalid time {} : {}", self, err))
    }
}

pub trait AsDate {
    fn as_date(&self) -> NaiveDate;
}

impl AsDate for NaiveDate {
    fn as_date(&self) -> NaiveDate {
        *self
    }
}

impl AsDate for &str {
    // Note: if the string is not in the right format, this conversion will fail
    fn as_date(&self) -> NaiveDate {
        NaiveDate::parse_from_str(self, "%Y-%m-%d")
            .unwrap_or_else(|err| panic!("invalid date {} : {}", self, err))
    }
}

struct StopTimeInfo {
    stop: String,
    arrival: Time,
    departure: Time,
    flow: FlowDirection,
}

struct TripInfo {
    id: String,
    route: RouteIdx,
    calendar: String,
    stop_times: Vec<StopTimeInfo>,
}

struct RouteInfo {
    name: String,
    transit_reluctance_index: usize,
}

pub struct TransitDataBuilder {
    calendars: Vec<(String, BTreeSet<NaiveDate>)>,
    stations: Vec<(String, Vec<String>)>,
    routes: Vec<RouteInfo>,
    trips: Vec<TripInfo>,
    transfers: Vec<(String, String, Time)>,
    constrained_transfers: Vec<(TransferPointName, TransferPointName, TransferConstraint)>,
}

/// Used to add trips to a route
pub struct RouteBuilder<'a> {
    builder: &'a mut TransitDataBuilder,
    route: RouteIdx,
}

/// Used to fill a new trip
pub struct TripBuilder<'a> {
    trip: &'a mut TripInfo,
}

impl Default for TransitDataBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DATE)
    }
}

impl TransitDataBuilder {
    /// All trips without an explicit calendar run on `date`
    pub fn new(date: impl AsDate) -> Self {
        let mut dates = BTreeSet::new();
        dates.insert(date.as_date());
        Self {
            calendars: vec![(DEFAULT_CALENDAR_ID.to_string(), dates)],
            stations: Vec::new(),
            routes: Vec::new(),
            trips: Vec::new(),
            transfers: Vec::new(),
            constrained_transfers: Vec::new(),
        }
    }

    pub fn calendar(mut self, id: &str, dates: &[impl AsDate]) -> Self {
        let dates = dates.iter().map(AsDate::as_date).collect();
        match self.calendars.iter_mut().find(|(calendar_id, _)| calendar_id == id) {
            Some((_, calendar_dates)) => *calendar_dates = dates,
            None => self.calendars.push((id.to_string(), dates)),
        }
        self
    }

    /// Group `stops` in the station `name`
    pub fn station(mut self, name: &str, stops: &[&str]) -> Self {
        self.stations.push((
            name.to_string(),
            stops.iter().map(|stop| stop.to_string()).collect(),
        ));
        self
    }

    /// Add trips to the route `name`, creating it if needed
    pub fn route<F>(mut self, name: &str, route_initer: F) -> Self
    where
        F: FnOnce(RouteBuilder),
    {
        let route = match self.routes.iter().position(|route| route.name == name) {
            Some(route) => route,
            None => {
                self.routes.push(RouteInfo {
                    name: name.to_string(),
                    transit_reluctance_index: 0,
                });
                self.routes.len() - 1
            }
        };
        route_initer(RouteBuilder {
            builder: &mut self,
            route,
        });
        self
    }

    /// Walking transfer from `from_stop` to `to_stop`
    pub fn transfer(mut self, from_stop: &str, to_stop: &str, duration: impl IntoTime) -> Self {
        self.transfers.push((
            from_stop.to_string(),
            to_stop.to_string(),
            duration.into_time(),
        ));
        self
    }

    pub fn constrained_transfer(
        mut self,
        from: TransferPointName,
        to: TransferPointName,
        constraint: TransferConstraint,
    ) -> Self {
        self.constrained_transfers.push((from, to, constraint));
        self
    }

    /// Consume the builder to create the transit data
    pub fn build(self) -> TransitData {
        let mut stop_by_name: HashMap<String, StopIdx> = HashMap::new();
        let mut stops: Vec<Stop> = Vec::new();
        let mut find_or_create_stop = |name: &str, stops: &mut Vec<Stop>| -> StopIdx {
            *stop_by_name.entry(name.to_string()).or_insert_with(|| {
                stops.push(Stop {
                    name: name.to_string(),
                    station: None,
                });
                stops.len() - 1
            })
        };

        let mut stations = Vec::with_capacity(self.stations.len());
        for (station_idx, (name, stop_names)) in self.stations.iter().enumerate() {
            let station_stops: Vec<StopIdx> = stop_names
                .iter()
                .map(|stop_name| find_or_create_stop(stop_name, &mut stops))
                .collect();
            for stop in station_stops.iter() {
                stops[*stop].station = Some(station_idx);
            }
            stations.push(Station {
                name: name.clone(),
                stops: station_stops,
            });
        }

        for trip in self.trips.iter() {
            for stop_time in trip.stop_times.iter() {
                find_or_create_stop(&stop_time.stop, &mut stops);
            }
        }
        for (from_stop, to_stop, _) in self.transfers.iter() {
            find_or_create_stop(from_stop, &mut stops);
            find_or_create_stop(to_stop, &mut stops);
        }
        drop(find_or_create_stop);

        let services: Vec<ServiceCalendar> = self
            .calendars
            .iter()
            .map(|(id, dates)| ServiceCalendar {
                id: id.clone(),
                dates: dates.clone(),
            })
            .collect();

        let routes: Vec<Route> = self
            .routes
            .iter()
            .map(|route| Route {
                name: route.name.clone(),
                transit_reluctance_index: route.transit_reluctance_index,
            })
            .collect();

        // trips sharing the same route, stops and flows end up in the same pattern,
        // unless they would overtake each other
        type PatternKey = (RouteIdx, Vec<StopIdx>, Vec<FlowDirection>);
        let mut patterns_by_key: HashMap<PatternKey, Vec<PatternIdx>> = HashMap::new();
        let mut patterns: Vec<Pattern> = Vec::new();
        let mut timetables: Vec<Timetable> = Vec::new();

        for (trip_idx, trip) in self.trips.iter().enumerate() {
            assert!(
                trip.stop_times.len() >= 2,
                "trip {} must have at least 2 stop times",
                trip.id
            );
            let service = services
                .iter()
                .position(|service| service.id == trip.calendar)
                .unwrap_or_else(|| panic!("unknown calendar {} for trip {}", trip.calendar, trip.id));
            let pattern_stops: Vec<StopIdx> = trip
                .stop_times
                .iter()
                .map(|stop_time| stop_by_name[&stop_time.stop])
                .collect();
            let flows: Vec<FlowDirection> =
                trip.stop_times.iter().map(|stop_time| stop_time.flow).collect();

            let schedule = TripSchedule {
                idx: trip_idx,
                id: trip.id.clone(),
                pattern: 0,
                route: trip.route,
                service,
                trip_index: 0,
                transit_reluctance_index: routes[trip.route].transit_reluctance_index,
                arrivals: trip.stop_times.iter().map(|st| st.arrival).collect(),
                departures: trip.stop_times.iter().map(|st| st.departure).collect(),
            };

            let key = (trip.route, pattern_stops.clone(), flows.clone());
            let candidates = patterns_by_key.entry(key).or_insert_with(Vec::new);
            let mut pending = Some(schedule);
            for pattern in candidates.iter() {
                if let Some(schedule) = pending.take() {
                    if let Err(rejected) = timetables[*pattern].try_insert(schedule) {
                        pending = Some(rejected);
                    }
                }
            }
            if let Some(schedule) = pending {
                let pattern_idx = patterns.len();
                let mut timetable = Timetable::new(pattern_idx, pattern_stops.len());
                if timetable.try_insert(schedule).is_err() {
                    unreachable!("a trip can always be inserted in an empty timetable");
                }
                debug!("New pattern {} created for trip {}", pattern_idx, trip.id);
                patterns.push(Pattern {
                    idx: pattern_idx,
                    route: trip.route,
                    stops: pattern_stops,
                    flows,
                });
                timetables.push(timetable);
                candidates.push(pattern_idx);
            }
        }

        let mut trip_by_id = HashMap::new();
        let mut patterns_by_stop = vec![Vec::new(); stops.len()];
        for (pattern_idx, timetable) in timetables.iter_mut().enumerate() {
            timetable.finalize(pattern_idx);
            for trip in timetable.trips() {
                trip_by_id.insert(trip.id.clone(), (pattern_idx, trip.trip_index));
            }
            for (position, stop) in patterns[pattern_idx].stops.iter().enumerate() {
                patterns_by_stop[*stop].push((pattern_idx, position));
            }
        }

        let mut transfers_from = vec![Vec::new(); stops.len()];
        let mut transfers_to = vec![Vec::new(); stops.len()];
        for (from_stop, to_stop, duration) in self.transfers.iter() {
            let transfer = Transfer {
                from_stop: stop_by_name[from_stop],
                to_stop: stop_by_name[to_stop],
                duration: *duration,
            };
            transfers_from[transfer.from_stop].push(transfer);
            transfers_to[transfer.to_stop].push(transfer);
        }

        let mut data = TransitData {
            stops,
            stations,
            routes,
            patterns,
            timetables,
            patterns_by_stop,
            transfers_from,
            transfers_to,
            services,
            stop_by_name,
            trip_by_id,
            constrained_transfers: None,
        };

        if !self.constrained_transfers.is_empty() {
            let constrained_transfers = self
                .constrained_transfers
                .iter()
                .map(|(from, to, constraint)| {
                    ConstrainedTransfer::new(
                        resolve_point(&data, from),
                        resolve_point(&data, to),
                        *constraint,
                    )
                })
                .collect();
            let stations_of_stops = data.stops.iter().map(|stop| stop.station).collect();
            data.constrained_transfers = Some(ConstrainedTransferIndex::new(
                constrained_transfers,
                &data.patterns,
                &data.timetables,
                stations_of_stops,
            ));
        }

        debug!(
            "Transit data built with {} stops, {} patterns and {} trips",
            data.stops.len(),
            data.patterns.len(),
            data.trip_by_id.len()
        );
        data
    }
}

fn resolve_point(data: &TransitData, point: &TransferPointName) -> TransferPoint {
    let stop_idx = |name: &str| -> StopIdx {
        *data
            .stop_by_name
            .get(name)
            .unwrap_or_else(|| panic!("unknown stop {}", name))
    };
    match point {
        TransferPointName::Stop(name) => TransferPoint::Stop(stop_idx(name)),
        TransferPointName::Station(name) => {
            let station: StationIdx = data
                .station_idx(name)
                .unwrap_or_else(|| panic!("unknown station {}", name));
            TransferPoint::Station(station)
        }
        TransferPointName::RouteStop { route, stop } => TransferPoint::RouteStop {
            route: data
                .route_idx(route)
                .unwrap_or_else(|| panic!("unknown route {}", route)),
            stop: stop_idx(stop),
        },
        TransferPointName::Trip {
            trip,
            stop_position,
        } => TransferPoint::Trip {
            trip: data
                .trip(trip)
                .unwrap_or_else(|| panic!("unknown trip {}", trip))
                .idx(),
            stop_position: *stop_position,
        },
        TransferPointName::Any(points) => {
            let composite =
                CompositeTransferPoint::new(points.iter().map(|point| resolve_point(data, point)))
                    .unwrap_or_else(|err| panic!("invalid composite transfer point : {}", err));
            TransferPoint::Composite(composite)
        }
    }
}

impl<'a> RouteBuilder<'a> {
    /// Add a new trip to the route
    pub fn trip<F>(mut self, id: &str, trip_initer: F) -> Self
    where
        F: FnOnce(TripBuilder),
    {
        assert!(
            self.builder.trips.iter().all(|trip| trip.id != id),
            "trip {} already exists",
            id
        );
        self.builder.trips.push(TripInfo {
            id: id.to_string(),
            route: self.route,
            calendar: DEFAULT_CALENDAR_ID.to_string(),
            stop_times: Vec::new(),
        });
        if let Some(trip) = self.builder.trips.last_mut() {
            trip_initer(TripBuilder { trip });
        }
        self
    }

    /// Index in `CostParams::transit_reluctance` used by the trips of this route
    pub fn transit_reluctance_index(mut self, index: usize) -> Self {
        self.builder.routes[self.route].transit_reluctance_index = index;
        self
    }
}

impl<'a> TripBuilder<'a> {
    /// add a stop time, with the same arrival and departure
    pub fn st(self, stop: &str, time: impl IntoTime) -> Self {
        let time = time.into_time();
        self.st_detailed(stop, time, time)
    }

    pub fn st_detailed(mut self, stop: &str, arrival: impl IntoTime, departure: impl IntoTime) -> Self {
        let arrival = arrival.into_time();
        let departure = departure.into_time();
        assert!(
            arrival <= departure,
            "trip {} departs from {} before arriving",
            self.trip.id,
            stop
        );
        self.trip.stop_times.push(StopTimeInfo {
            stop: stop.to_string(),
            arrival,
            departure,
            flow: FlowDirection::BoardAndDebark,
        });
        self
    }

    /// forbid boarding at the last added stop time
    pub fn no_board(self) -> Self {
        self.update_last_flow(|flow| match flow {
            FlowDirection::BoardAndDebark | FlowDirection::DebarkOnly => FlowDirection::DebarkOnly,
            FlowDirection::BoardOnly | FlowDirection::NoBoardDebark => FlowDirection::NoBoardDebark,
        })
    }

    /// forbid debarking at the last added stop time
    pub fn no_debark(self) -> Self {
        self.update_last_flow(|flow| match flow {
            FlowDirection::BoardAndDebark | FlowDirection::BoardOnly => FlowDirection::BoardOnly,
            FlowDirection::DebarkOnly | FlowDirection::NoBoardDebark => FlowDirection::NoBoardDebark,
        })
    }

    pub fn calendar(mut self, id: &str) -> Self {
        self.trip.calendar = id.to_string();
        self
    }

    fn update_last_flow<F>(mut self, update: F) -> Self
    where
        F: FnOnce(FlowDirection) -> FlowDirection,
    {
        let stop_time = self
            .trip
            .stop_times
            .last_mut()
            .unwrap_or_else(|| panic!("no stop time to update"));
        stop_time.flow = update(stop_time.flow);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit_data::TransitDataProvider;

    #[test]
    fn overtaking_trips_are_split_in_patterns() {
        let data = TransitDataBuilder::default()
            .route("R", |r| {
                r.trip("slow", |t| {
                    t.st("A", "10:00").st("B", "10:30");
                })
                .trip("fast", |t| {
                    t.st("A", "10:05").st("B", "10:20");
                })
                .trip("late", |t| {
                    t.st("A", "10:10").st("B", "10:40");
                });
            })
            .build();
        assert_eq!(data.nb_of_patterns(), 2);
        let slow = data.trip("slow").unwrap();
        let fast = data.trip("fast").unwrap();
        let late = data.trip("late").unwrap();
        assert_ne!(slow.pattern(), fast.pattern());
        assert_eq!(slow.pattern(), late.pattern());
        assert_eq!(late.trip_index(), 1);
        let a = data.stop_idx("A").unwrap();
        assert_eq!(data.patterns_at(a).len(), 2);
    }

    #[test]
    fn flows_split_patterns() {
        let data = TransitDataBuilder::default()
            .route("R", |r| {
                r.trip("t1", |t| {
                    t.st("A", "10:00").st("B", "10:10").no_board().st("C", "10:20");
                })
                .trip("t2", |t| {
                    t.st("A", "11:00").st("B", "11:10").st("C", "11:20");
                });
            })
            .build();
        assert_eq!(data.nb_of_patterns(), 2);
        let t1 = data.trip("t1").unwrap();
        let pattern = data.pattern(t1.pattern());
        assert!(!pattern.can_board(1));
        assert!(pattern.can_debark(1));
    }

    #[test]
    fn calendars_and_stations() {
        let data = TransitDataBuilder::new("2021-03-01")
            .calendar("weekend", &["2021-03-06", "2021-03-07"])
            .station("S", &["A", "B"])
            .route("R", |r| {
                r.trip("t1", |t| {
                    t.calendar("weekend").st("A", "10:00").st("C", "10:10");
                });
            })
            .transfer("A", "B", "00:03:00")
            .build();
        let a = data.stop_idx("A").unwrap();
        let b = data.stop_idx("B").unwrap();
        assert_eq!(data.station_of(a), data.station_of(b));
        assert_eq!(data.station_of(data.stop_idx("C").unwrap()), None);
        assert_eq!(data.transfers_from(a)[0].duration, 180);
        assert_eq!(data.transfers_to(b)[0].from_stop, a);

        let t1 = data.trip("t1").unwrap();
        let saturday = data.active_services("2021-03-06".as_date());
        let monday = data.active_services("2021-03-01".as_date());
        assert!(saturday.contains(t1.service()));
        assert!(!monday.contains(t1.service()));
    }

    #[test]
    #[should_panic]
    fn unknown_calendar_panics() {
        TransitDataBuilder::default()
            .route("R", |r| {
                r.trip("t1", |t| {
                    t.calendar("unknown").st("A", "10:00").st("C", "10:10");
                });
            })
            .build();
    }
}
