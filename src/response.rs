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

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::cost::Cost;
use crate::path::{Path, PathLeg};
use crate::time::{format_duration_short, Time};
use crate::transit_data::TransitDataProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSection {
    pub from_datetime: NaiveDateTime,
    pub to_datetime: NaiveDateTime,
    pub from_stop: String,
    pub to_stop: String,
    pub route: String,
    pub trip_id: String,
    // index of the boarding in the pattern of the trip
    pub from_position: usize,
    pub to_position: usize,
    /// constraint of the transfer toward this vehicle, "regular" when there is none
    pub constraint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSection {
    pub from_datetime: NaiveDateTime,
    pub to_datetime: NaiveDateTime,
    pub from_stop: String,
    pub to_stop: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingSection {
    pub from_datetime: NaiveDateTime,
    pub to_datetime: NaiveDateTime,
    pub stop: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Section {
    Vehicle(VehicleSection),
    Transfer(TransferSection),
    Waiting(WaitingSection),
}

/// A path expressed with calendar datetimes and names, for display and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    pub departure_datetime: NaiveDateTime,
    pub arrival_datetime: NaiveDateTime,
    pub departure_fallback_duration: Time,
    pub arrival_fallback_duration: Time,
    pub sections: Vec<Section>,
    pub nb_of_transfers: usize,
    pub generalized_cost: Cost,
}

fn to_datetime(date: NaiveDate, time: Time) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::seconds(i64::from(time))
}

impl Journey {
    /// `date` is the day of the service, times of `path` being seconds since its midnight.
    pub fn from_path<Data>(path: &Path, date: NaiveDate, data: &Data) -> Self
    where
        Data: TransitDataProvider,
    {
        let mut sections = Vec::with_capacity(path.legs().len() * 2);
        let mut arrival_time = path.access().to_time;
        let mut arrival_stop = path.access().leg.stop;
        for leg in path.legs() {
            match leg {
                PathLeg::Transit(transit) => {
                    let board_time = transit.board_time();
                    if board_time > arrival_time {
                        sections.push(Section::Waiting(WaitingSection {
                            from_datetime: to_datetime(date, arrival_time),
                            to_datetime: to_datetime(date, board_time),
                            stop: data.stop_name(arrival_stop).to_string(),
                        }));
                    }
                    sections.push(Section::Vehicle(VehicleSection {
                        from_datetime: to_datetime(date, board_time),
                        to_datetime: to_datetime(date, transit.alight_time()),
                        from_stop: data.stop_name(transit.board_stop).to_string(),
                        to_stop: data.stop_name(transit.alight_stop).to_string(),
                        route: data.route_name(transit.trip.route()).to_string(),
                        trip_id: transit.trip.id().to_string(),
                        from_position: transit.board_position,
                        to_position: transit.alight_position,
                        constraint: transit.constraint.to_string(),
                    }));
                    arrival_time = transit.alight_time();
                    arrival_stop = transit.alight_stop;
                }
                PathLeg::Transfer(transfer) => {
                    if transfer.from_time > arrival_time {
                        sections.push(Section::Waiting(WaitingSection {
                            from_datetime: to_datetime(date, arrival_time),
                            to_datetime: to_datetime(date, transfer.from_time),
                            stop: data.stop_name(arrival_stop).to_string(),
                        }));
                    }
                    sections.push(Section::Transfer(TransferSection {
                        from_datetime: to_datetime(date, transfer.from_time),
                        to_datetime: to_datetime(date, transfer.to_time),
                        from_stop: data.stop_name(transfer.from_stop).to_string(),
                        to_stop: data.stop_name(transfer.to_stop).to_string(),
                    }));
                    arrival_time = transfer.to_time;
                    arrival_stop = transfer.to_stop;
                }
            }
        }

        Self {
            departure_datetime: to_datetime(date, path.start_time()),
            arrival_datetime: to_datetime(date, path.end_time()),
            departure_fallback_duration: path.access().leg.duration,
            arrival_fallback_duration: path.egress().leg.duration,
            sections,
            nb_of_transfers: path.nb_of_transfers(),
            generalized_cost: path.cost(),
        }
    }

    pub fn vehicle_sections(&self) -> impl Iterator<Item = &VehicleSection> + '_ {
        self.sections.iter().filter_map(|section| match section {
            Section::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        })
    }

    pub fn nb_of_vehicles(&self) -> usize {
        self.vehicle_sections().count()
    }

    /// in seconds
    pub fn total_duration(&self) -> Time {
        seconds_between(self.departure_datetime, self.arrival_datetime)
    }

    /// in seconds, walking between stops only
    pub fn total_transfer_duration(&self) -> Time {
        self.sections
            .iter()
            .map(|section| match section {
                Section::Transfer(transfer) => seconds_between(transfer.from_datetime, transfer.to_datetime),
                _ => 0,
            })
            .sum()
    }

    pub fn print(&self) -> Result<String, std::fmt::Error> {
        let mut result = String::new();
        self.write(&mut result)?;
        Ok(result)
    }

    fn write_date(date: &NaiveDateTime) -> String {
        date.format("%H:%M:%S %d-%b-%y").to_string()
    }

    pub fn write<Writer: std::fmt::Write>(&self, writer: &mut Writer) -> Result<(), std::fmt::Error> {
        writeln!(writer, "*** New journey ***")?;
        writeln!(writer, "Departure : {}", Self::write_date(&self.departure_datetime))?;
        writeln!(writer, "Arrival : {}", Self::write_date(&self.arrival_datetime))?;
        writeln!(
            writer,
            "Transfer duration : {}",
            format_duration_short(self.total_transfer_duration())
        )?;
        writeln!(writer, "Nb of vehicles : {}", self.nb_of_vehicles())?;
        writeln!(
            writer,
            "Fallback start {}, end {}",
            format_duration_short(self.departure_fallback_duration),
            format_duration_short(self.arrival_fallback_duration)
        )?;
        writeln!(writer, "Generalized cost : {}", self.generalized_cost)?;
        for vehicle in self.vehicle_sections() {
            writeln!(
                writer,
                "{} {} from {} at {} to {} at {} ({})",
                vehicle.route,
                vehicle.trip_id,
                vehicle.from_stop,
                Self::write_date(&vehicle.from_datetime),
                vehicle.to_stop,
                Self::write_date(&vehicle.to_datetime),
                vehicle.constraint
            )?;
        }
        Ok(())
    }
}

fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> Time {
    let seconds = (to - from).num_seconds();
    seconds.clamp(i64::from(Time::MIN), i64::from(Time::MAX)) as Time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained_transfer::TransferConstraint;
    use crate::cost::CostCalculator;
    use crate::path::{TransferLeg, TransitLeg};
    use crate::request::{AccessEgress, SlackParams};
    use crate::transit_data::builder::{AsDate, TransitDataBuilder};

    #[test]
    fn journey_sections_from_path() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("C", "10:20").st("D", "23:50").st("E", "24:30");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let transit = |trip: &str, board: usize, alight: usize, board_stop: &str, alight_stop: &str| TransitLeg {
            trip: data.trip(trip).unwrap(),
            board_position: board,
            alight_position: alight,
            board_stop: stop(board_stop),
            alight_stop: stop(alight_stop),
            constraint: TransferConstraint::Regular,
        };
        let path = Path::new(
            AccessEgress::walking(stop("A"), 120, 240_00),
            vec![
                PathLeg::Transit(transit("R1-1", 0, 1, "A", "B")),
                PathLeg::Transfer(TransferLeg::new(stop("B"), stop("C"), 180)),
                PathLeg::Transit(transit("R2-1", 0, 2, "C", "E")),
            ],
            AccessEgress::walking(stop("E"), 60, 120_00),
            &SlackParams {
                board_slack: 0,
                alight_slack: 0,
                transfer_slack: 0,
            },
            &CostCalculator::default(),
            0,
        );

        let date = "2020-01-01".as_date();
        let journey = Journey::from_path(&path, date, &data);

        assert_eq!(journey.nb_of_vehicles(), 2);
        assert_eq!(journey.nb_of_transfers, 1);
        assert_eq!(journey.total_transfer_duration(), 180);
        assert_eq!(journey.departure_datetime, date.and_hms(9, 58, 0));
        // the second trip ends after midnight
        assert_eq!(journey.arrival_datetime, "2020-01-02".as_date().and_hms(0, 31, 0));
        assert_eq!(journey.total_duration(), 14 * 3600 + 33 * 60);

        // the transfer is done right after alighting, and the traveler waits at C
        match &journey.sections[1..] {
            [Section::Transfer(transfer), Section::Waiting(waiting), Section::Vehicle(vehicle)] => {
                assert_eq!(transfer.from_stop, "B");
                assert_eq!(transfer.to_datetime, date.and_hms(10, 13, 0));
                assert_eq!(waiting.stop, "C");
                assert_eq!(waiting.to_datetime, date.and_hms(10, 20, 0));
                assert_eq!(vehicle.trip_id, "R2-1");
                assert_eq!(vehicle.route, "R2");
                assert_eq!(vehicle.to_stop, "E");
            }
            sections => panic!("unexpected sections {:?}", sections),
        }
        let printed = journey.print().unwrap();
        assert!(printed.contains("R1 R1-1 from A at 10:00:00 01-Jan-20 to B at 10:10:00 01-Jan-20"));
    }
}
