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

use std::fmt::{Display, Formatter};

use crate::constrained_transfer::TransferConstraint;
use crate::cost::{Cost, CostCalculator};
use crate::request::{AccessEgress, SlackParams};
use crate::time::{format_duration_short, format_time, format_time_short, Time};
use crate::transit_data::{StopIdx, TransitDataProvider, TripSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessLeg {
    pub leg: AccessEgress,
    pub from_time: Time,
    pub to_time: Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgressLeg {
    pub leg: AccessEgress,
    pub from_time: Time,
    pub to_time: Time,
}

/// A ride on one trip, in the order experienced by the traveler.
#[derive(Debug, Clone, Copy)]
pub struct TransitLeg<'data> {
    pub trip: &'data TripSchedule,
    pub board_position: usize,
    pub alight_position: usize,
    pub board_stop: StopIdx,
    pub alight_stop: StopIdx,
    /// constraint of the transfer used to board this trip
    pub constraint: TransferConstraint,
}

impl<'data> TransitLeg<'data> {
    pub fn board_time(&self) -> Time {
        self.trip.departure(self.board_position)
    }

    pub fn alight_time(&self) -> Time {
        self.trip.arrival(self.alight_position)
    }

    pub fn duration(&self) -> Time {
        self.alight_time() - self.board_time()
    }

    /// Same trip, same boarding and alighting
    pub fn is_same(&self, other: &TransitLeg) -> bool {
        self.trip.is_same(other.trip)
            && self.board_position == other.board_position
            && self.alight_position == other.alight_position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLeg {
    pub from_stop: StopIdx,
    pub to_stop: StopIdx,
    pub duration: Time,
    pub from_time: Time,
    pub to_time: Time,
}

impl TransferLeg {
    /// Times are set when the leg is inserted in a `Path`
    pub fn new(from_stop: StopIdx, to_stop: StopIdx, duration: Time) -> Self {
        Self {
            from_stop,
            to_stop,
            duration,
            from_time: 0,
            to_time: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PathLeg<'data> {
    Transit(TransitLeg<'data>),
    Transfer(TransferLeg),
}

/// A journey from the origin to the destination, in real-time order.
///
/// Access and transfer legs are time-shifted toward the transit leg that follows them,
/// so that no time is spent waiting at the origin.
#[derive(Debug, Clone)]
pub struct Path<'data> {
    access: AccessLeg,
    legs: Vec<PathLeg<'data>>,
    egress: EgressLeg,
    cost: Cost,
}

impl<'data> Path<'data> {
    /// `fallback_departure` is used as the departure time of a path without transit leg
    pub fn new(
        access: AccessEgress,
        mut legs: Vec<PathLeg<'data>>,
        egress: AccessEgress,
        slacks: &SlackParams,
        calculator: &CostCalculator,
        fallback_departure: Time,
    ) -> Self {
        let first_transit = legs.iter().position(|leg| matches!(leg, PathLeg::Transit(_)));

        // before the first transit leg, walk back in time from the first boarding
        let access_to_time = match first_transit {
            Some(first_transit) => {
                let mut time = match &legs[first_transit] {
                    PathLeg::Transit(transit) => transit.board_time() - slacks.board_slack,
                    PathLeg::Transfer(transfer) => transfer.from_time,
                };
                for leg in legs[..first_transit].iter_mut().rev() {
                    if let PathLeg::Transfer(transfer) = leg {
                        transfer.to_time = time;
                        transfer.from_time = time - transfer.duration;
                        time = transfer.from_time;
                    }
                }
                time
            }
            None => fallback_departure + access.duration,
        };

        // after it, walk forward
        let mut time = access_to_time;
        let first_after = first_transit.unwrap_or(0);
        for leg in legs[first_after..].iter_mut() {
            match leg {
                PathLeg::Transit(transit) => time = transit.alight_time() + slacks.alight_slack,
                PathLeg::Transfer(transfer) => {
                    transfer.from_time = time;
                    transfer.to_time = time + transfer.duration;
                    time = transfer.to_time;
                }
            }
        }

        let mut path = Self {
            access: AccessLeg {
                leg: access,
                from_time: access_to_time - access.duration,
                to_time: access_to_time,
            },
            legs,
            egress: EgressLeg {
                leg: egress,
                from_time: time,
                to_time: time + egress.duration,
            },
            cost: 0,
        };
        path.cost = path.compute_generalized_cost(calculator, slacks);
        path
    }

    pub fn access(&self) -> &AccessLeg {
        &self.access
    }

    pub fn egress(&self) -> &EgressLeg {
        &self.egress
    }

    pub fn legs(&self) -> &[PathLeg<'data>] {
        &self.legs
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg<'data>> + '_ {
        self.legs.iter().filter_map(|leg| match leg {
            PathLeg::Transit(transit) => Some(transit),
            PathLeg::Transfer(_) => None,
        })
    }

    pub fn nb_of_transit_legs(&self) -> usize {
        self.transit_legs().count()
    }

    /// Each ride after the first one is a transfer. On-board access and egress legs are rides.
    pub fn nb_of_transfers(&self) -> usize {
        let nb_of_rides = self.nb_of_transit_legs()
            + usize::from(self.access.leg.on_board)
            + usize::from(self.egress.leg.on_board);
        nb_of_rides.saturating_sub(1)
    }

    pub fn start_time(&self) -> Time {
        self.access.from_time
    }

    pub fn end_time(&self) -> Time {
        self.egress.to_time
    }

    pub fn duration(&self) -> Time {
        self.end_time() - self.start_time()
    }

    /// generalized cost
    pub fn cost(&self) -> Cost {
        self.cost
    }

    fn compute_generalized_cost(&self, calculator: &CostCalculator, slacks: &SlackParams) -> Cost {
        let mut cost = self.access.leg.cost;
        let mut first_boarding = !self.access.leg.on_board;
        let mut arrival_time = self.access.to_time;
        let mut last_alight_time = arrival_time;
        for leg in self.legs.iter() {
            match leg {
                PathLeg::Transit(transit) => {
                    let prev_arrival_time = if first_boarding {
                        transit.board_time() - slacks.board_slack
                    } else if transit.constraint.is_facilitated() {
                        // the wait is counted from the alighting, slack excluded
                        last_alight_time
                    } else {
                        arrival_time
                    };
                    cost += calculator.boarding_cost(
                        first_boarding,
                        prev_arrival_time,
                        transit.board_stop,
                        transit.board_time(),
                        transit.trip,
                        transit.constraint,
                    );
                    cost += calculator.transit_arrival_cost(
                        0,
                        slacks.alight_slack,
                        transit.duration(),
                        transit.trip,
                        transit.alight_stop,
                    );
                    first_boarding = false;
                    last_alight_time = transit.alight_time();
                    arrival_time = last_alight_time + slacks.alight_slack;
                }
                PathLeg::Transfer(transfer) => {
                    cost += calculator.walk_cost(transfer.duration);
                    arrival_time = transfer.to_time;
                }
            }
        }
        cost + self.egress.leg.cost
    }

    /// Human readable description, with stop and route names
    pub fn describe<Data: TransitDataProvider>(&self, data: &Data) -> String {
        let mut result = format!(
            "{} {} ~ {}",
            if self.access.leg.on_board { "Ride" } else { "Walk" },
            format_duration_short(self.access.leg.duration),
            data.stop_name(self.access.leg.stop)
        );
        for leg in self.legs.iter() {
            match leg {
                PathLeg::Transit(transit) => result.push_str(&format!(
                    " ~ {} {} {} {} ~ {}",
                    data.route_name(transit.trip.route()),
                    transit.trip.id(),
                    format_time_short(transit.board_time()),
                    format_time_short(transit.alight_time()),
                    data.stop_name(transit.alight_stop)
                )),
                PathLeg::Transfer(transfer) => result.push_str(&format!(
                    " ~ Walk {} ~ {}",
                    format_duration_short(transfer.duration),
                    data.stop_name(transfer.to_stop)
                )),
            }
        }
        result.push_str(&format!(
            " ~ {} {} [{}]",
            if self.egress.leg.on_board { "Ride" } else { "Walk" },
            format_duration_short(self.egress.leg.duration),
            self.summary()
        ));
        result
    }

    fn summary(&self) -> String {
        format!(
            "{} {} {} Tx{} C{}",
            format_time(self.start_time()),
            format_time(self.end_time()),
            format_duration_short(self.duration()),
            self.nb_of_transfers(),
            self.cost
        )
    }
}

impl<'data> Display for Path<'data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Walk {} ~ {}",
            format_duration_short(self.access.leg.duration),
            self.access.leg.stop
        )?;
        for leg in self.legs.iter() {
            match leg {
                PathLeg::Transit(transit) => write!(
                    f,
                    " ~ {} {} {} ~ {}",
                    transit.trip.id(),
                    format_time_short(transit.board_time()),
                    format_time_short(transit.alight_time()),
                    transit.alight_stop
                )?,
                PathLeg::Transfer(transfer) => write!(
                    f,
                    " ~ Walk {} ~ {}",
                    format_duration_short(transfer.duration),
                    transfer.to_stop
                )?,
            }
        }
        write!(
            f,
            " ~ Walk {} [{}]",
            format_duration_short(self.egress.leg.duration),
            self.summary()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit_data::builder::TransitDataBuilder;
    use crate::transit_data::TransitDataProvider;

    #[test]
    fn times_are_shifted_toward_transit() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("C", "10:20").st("D", "10:30");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let r1 = data.trip("R1-1").unwrap();
        let r2 = data.trip("R2-1").unwrap();
        let slacks = SlackParams {
            board_slack: 30,
            alight_slack: 15,
            transfer_slack: 0,
        };
        let calculator = CostCalculator::default();
        let path = Path::new(
            AccessEgress::walking(stop("A"), 120, 240_00),
            vec![
                PathLeg::Transit(TransitLeg {
                    trip: r1,
                    board_position: 0,
                    alight_position: 1,
                    board_stop: stop("A"),
                    alight_stop: stop("B"),
                    constraint: TransferConstraint::Regular,
                }),
                PathLeg::Transfer(TransferLeg::new(stop("B"), stop("C"), 180)),
                PathLeg::Transit(TransitLeg {
                    trip: r2,
                    board_position: 0,
                    alight_position: 1,
                    board_stop: stop("C"),
                    alight_stop: stop("D"),
                    constraint: TransferConstraint::Regular,
                }),
            ],
            AccessEgress::walking(stop("D"), 60, 120_00),
            &slacks,
            &calculator,
            0,
        );

        // 10:00 - 30s of board slack - 2 minutes of walk
        assert_eq!(path.start_time(), 10 * 3600 - 150);
        assert_eq!(path.end_time(), 10 * 3600 + 30 * 60 + 15 + 60);
        assert_eq!(path.nb_of_transfers(), 1);
        match path.legs()[1] {
            PathLeg::Transfer(transfer) => {
                assert_eq!(transfer.from_time, 10 * 3600 + 10 * 60 + 15);
                assert_eq!(transfer.to_time, 10 * 3600 + 10 * 60 + 195);
            }
            PathLeg::Transit(_) => panic!("a transfer is expected"),
        }
        assert_eq!(
            path.describe(&data),
            "Walk 2m ~ A ~ R1 R1-1 10:00 10:10 ~ B ~ Walk 3m ~ C ~ R2 R2-1 10:20 10:30 ~ D \
             ~ Walk 1m [09:57:30 10:31:15 33m45s Tx1 C".to_string()
                + &path.cost().to_string()
                + "]"
        );

        // access 240 + board 600 + slack 30 + ride 600 + alight slack 15 + walk 2 * 180
        // + wait (10:20 - 10:13:15) + board 600 + ride 600 + alight slack 15 + egress 120
        let expected_seconds = 240 + 600 + 30 + 600 + 15 + 360 + 405 + 600 + 600 + 15 + 120;
        assert_eq!(path.cost(), expected_seconds * 100);
    }

    #[test]
    fn stay_seated_transfer_is_cheaper_than_a_regular_one() {
        let data = TransitDataBuilder::default()
            .route("R1", |r| {
                r.trip("R1-1", |t| {
                    t.st("A", "10:00").st("B", "10:10");
                });
            })
            .route("R2", |r| {
                r.trip("R2-1", |t| {
                    t.st("B", "10:10").st("C", "10:20");
                });
            })
            .route("R3", |r| {
                r.trip("R3-1", |t| {
                    t.st("D", "10:25").st("E", "10:35");
                });
            })
            .build();
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let transit = |trip: &str, from: &str, to: &str, constraint: TransferConstraint| {
            PathLeg::Transit(TransitLeg {
                trip: data.trip(trip).unwrap(),
                board_position: 0,
                alight_position: 1,
                board_stop: stop(from),
                alight_stop: stop(to),
                constraint,
            })
        };
        let slacks = SlackParams {
            board_slack: 0,
            alight_slack: 0,
            transfer_slack: 0,
        };
        let calculator = CostCalculator::default();
        let path_with = |constraint: TransferConstraint| {
            Path::new(
                AccessEgress::walking(stop("A"), 0, 0),
                vec![
                    transit("R1-1", "A", "B", TransferConstraint::Regular),
                    transit("R2-1", "B", "C", constraint),
                    PathLeg::Transfer(TransferLeg::new(stop("C"), stop("D"), 120)),
                    transit("R3-1", "D", "E", TransferConstraint::Regular),
                ],
                AccessEgress::walking(stop("E"), 0, 0),
                &slacks,
                &calculator,
                0,
            )
        };

        let stay_seated = path_with(TransferConstraint::StaySeated);
        let regular = path_with(TransferConstraint::Regular);
        assert_eq!(stay_seated.nb_of_transfers(), 2);
        assert_eq!(stay_seated.end_time(), regular.end_time());
        assert!(stay_seated.cost() < regular.cost());
    }
}
