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

use serde::{Deserialize, Serialize};

use crate::constrained_transfer::TransferConstraint;
use crate::time::Time;
use crate::transit_data::{StopIdx, TripSchedule};

/// Generalized cost, in centi-seconds.
pub type Cost = i32;

/// Convert a cost in seconds to a raptor cost
pub fn to_raptor_cost(seconds: f64) -> Cost {
    (seconds * 100.0).round() as Cost
}

/// Convert a raptor cost to seconds
pub fn to_seconds(cost: Cost) -> f64 {
    f64::from(cost) / 100.0
}

// a factor applied to a time in seconds gives a cost in centi-seconds
fn to_centi_factor(factor: f64) -> i32 {
    (factor * 100.0).round() as i32
}

pub const DEFAULT_BOARD_COST: Time = 600;
pub const DEFAULT_TRANSFER_COST: Time = 0;
pub const DEFAULT_WAIT_RELUCTANCE: f64 = 1.0;
pub const DEFAULT_WALK_RELUCTANCE: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CostParams {
    /// cost of each boarding, in seconds
    #[serde(default = "default_board_cost")]
    pub board_cost: Time,

    /// extra cost of each boarding after the first one, in seconds
    #[serde(default = "default_transfer_cost")]
    pub transfer_cost: Time,

    #[serde(default = "default_wait_reluctance")]
    pub wait_reluctance: f64,

    #[serde(default = "default_walk_reluctance")]
    pub walk_reluctance: f64,

    /// reluctance of riding a trip, indexed by the trip transit reluctance index.
    /// A missing index means 1.0
    #[serde(default)]
    pub transit_reluctance: Vec<f64>,

    /// cost of boarding or alighting at each stop, in seconds, indexed by stop
    #[serde(default)]
    pub stop_costs: Option<Vec<Time>>,
}

pub fn default_board_cost() -> Time {
    DEFAULT_BOARD_COST
}

pub fn default_transfer_cost() -> Time {
    DEFAULT_TRANSFER_COST
}

pub fn default_wait_reluctance() -> f64 {
    DEFAULT_WAIT_RELUCTANCE
}

pub fn default_walk_reluctance() -> f64 {
    DEFAULT_WALK_RELUCTANCE
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            board_cost: default_board_cost(),
            transfer_cost: default_transfer_cost(),
            wait_reluctance: default_wait_reluctance(),
            walk_reluctance: default_walk_reluctance(),
            transit_reluctance: Vec::new(),
            stop_costs: None,
        }
    }
}

/// Computes generalized costs from `CostParams`.
///
/// All factors are converted once to integer centi-factors,
/// so that `factor * seconds` directly gives a `Cost`.
#[derive(Debug, Clone)]
pub struct CostCalculator {
    board_cost: Cost,
    board_and_transfer_cost: Cost,
    wait_factor: i32,
    walk_factor: i32,
    transit_factors: Vec<i32>,
    min_transit_factor: i32,
    stop_costs: Option<Vec<Cost>>,
}

const DEFAULT_TRANSIT_CENTI_FACTOR: i32 = 100;

impl CostCalculator {
    pub fn new(params: &CostParams) -> Self {
        let transit_factors: Vec<i32> = params
            .transit_reluctance
            .iter()
            .map(|factor| to_centi_factor(*factor))
            .collect();
        let min_transit_factor = transit_factors
            .iter()
            .copied()
            .chain(std::iter::once(DEFAULT_TRANSIT_CENTI_FACTOR))
            .min()
            .unwrap_or(DEFAULT_TRANSIT_CENTI_FACTOR);
        Self {
            board_cost: to_raptor_cost(f64::from(params.board_cost)),
            board_and_transfer_cost: to_raptor_cost(f64::from(
                params.board_cost + params.transfer_cost,
            )),
            wait_factor: to_centi_factor(params.wait_reluctance),
            walk_factor: to_centi_factor(params.walk_reluctance),
            transit_factors,
            min_transit_factor,
            stop_costs: params.stop_costs.as_ref().map(|costs| {
                costs
                    .iter()
                    .map(|cost| to_raptor_cost(f64::from(*cost)))
                    .collect()
            }),
        }
    }

    /// Cost of boarding `trip` at `stop` at `board_time`, after arriving at `prev_arrival_time`.
    ///
    /// On the first boarding the traveler leaves the origin just in time,
    /// so callers pass `prev_arrival_time` such that no wait is charged.
    pub fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: Time,
        stop: StopIdx,
        board_time: Time,
        trip: &TripSchedule,
        constraint: TransferConstraint,
    ) -> Cost {
        let wait_time = (board_time - prev_arrival_time).abs();
        match constraint {
            // the wait is spent on board
            TransferConstraint::StaySeated => self.transit_factor(trip) * wait_time,
            TransferConstraint::Guaranteed => {
                self.wait_factor * wait_time + self.board_cost + self.stop_cost(stop)
            }
            _ => {
                let board_cost = if first_boarding {
                    self.board_cost
                } else {
                    self.board_and_transfer_cost
                };
                self.wait_factor * wait_time + board_cost + self.stop_cost(stop)
            }
        }
    }

    /// Total cost when alighting from `trip` at `stop`, `board_cost` being
    /// the cost of the arrival the trip was boarded from plus the boarding cost.
    pub fn transit_arrival_cost(
        &self,
        board_cost: Cost,
        alight_slack: Time,
        transit_time: Time,
        trip: &TripSchedule,
        stop: StopIdx,
    ) -> Cost {
        board_cost
            + self.transit_factor(trip) * transit_time
            + self.wait_factor * alight_slack
            + self.stop_cost(stop)
    }

    pub fn wait_cost(&self, wait_time: Time) -> Cost {
        self.wait_factor * wait_time
    }

    pub fn walk_cost(&self, walk_duration: Time) -> Cost {
        self.walk_factor * walk_duration
    }

    /// A lower bound of the cost of any journey lasting at least `min_travel_time`
    /// with at least `min_number_of_transfers` transfers.
    pub fn calculate_min_cost(&self, min_travel_time: Time, min_number_of_transfers: u8) -> Cost {
        self.board_cost
            + self.board_and_transfer_cost * Cost::from(min_number_of_transfers)
            + self.min_transit_factor * min_travel_time
    }

    pub fn transit_factor(&self, trip: &TripSchedule) -> i32 {
        self.transit_factor_at(trip.transit_reluctance_index())
    }

    pub fn transit_factor_at(&self, transit_reluctance_index: usize) -> i32 {
        self.transit_factors
            .get(transit_reluctance_index)
            .copied()
            .unwrap_or(DEFAULT_TRANSIT_CENTI_FACTOR)
    }

    pub fn min_transit_factor(&self) -> i32 {
        self.min_transit_factor
    }

    pub fn board_cost(&self) -> Cost {
        self.board_cost
    }

    pub fn board_and_transfer_cost(&self) -> Cost {
        self.board_and_transfer_cost
    }

    pub fn stop_cost(&self, stop: StopIdx) -> Cost {
        match &self.stop_costs {
            Some(costs) => costs.get(stop).copied().unwrap_or(0),
            None => 0,
        }
    }
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(&CostParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(transit_reluctance_index: usize) -> TripSchedule {
        TripSchedule {
            idx: 0,
            id: "trip".to_string(),
            pattern: 0,
            route: 0,
            service: 0,
            trip_index: 0,
            transit_reluctance_index,
            arrivals: vec![0, 600],
            departures: vec![0, 600],
        }
    }

    fn calculator() -> CostCalculator {
        CostCalculator::new(&CostParams {
            board_cost: 600,
            transfer_cost: 120,
            wait_reluctance: 1.0,
            walk_reluctance: 2.0,
            transit_reluctance: vec![1.0, 1.5],
            stop_costs: Some(vec![0, 30]),
        })
    }

    #[test]
    fn costs_are_centi_seconds() {
        assert_eq!(to_raptor_cost(1.5), 150);
        assert!((to_seconds(250) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn first_boarding_has_no_transfer_cost() {
        let calculator = calculator();
        let trip = trip(0);
        let first = calculator.boarding_cost(true, 100, 0, 100, &trip, TransferConstraint::Regular);
        assert_eq!(first, 600_00);
        let second =
            calculator.boarding_cost(false, 100, 0, 160, &trip, TransferConstraint::Regular);
        assert_eq!(second, 60_00 + 720_00);
    }

    #[test]
    fn facilitated_boardings() {
        let calculator = calculator();
        let trip = trip(1);
        let stay_seated =
            calculator.boarding_cost(false, 100, 0, 160, &trip, TransferConstraint::StaySeated);
        // the 60s are spent on board, with the transit reluctance of the trip
        assert_eq!(stay_seated, 90_00);
        let guaranteed =
            calculator.boarding_cost(false, 100, 1, 160, &trip, TransferConstraint::Guaranteed);
        assert_eq!(guaranteed, 60_00 + 600_00 + 30_00);
        let min_time = calculator.boarding_cost(
            false,
            100,
            0,
            160,
            &trip,
            TransferConstraint::MinTransferTime(60),
        );
        assert_eq!(min_time, 60_00 + 720_00);
    }

    #[test]
    fn transit_arrival_cost_uses_trip_reluctance() {
        let calculator = calculator();
        assert_eq!(
            calculator.transit_arrival_cost(1000, 0, 600, &trip(0), 0),
            1000 + 600_00
        );
        assert_eq!(
            calculator.transit_arrival_cost(1000, 10, 600, &trip(1), 1),
            1000 + 900_00 + 10_00 + 30_00
        );
        // unknown reluctance index
        assert_eq!(calculator.transit_factor(&trip(7)), 100);
    }

    #[test]
    fn min_cost_is_a_lower_bound() {
        let calculator = calculator();
        assert_eq!(calculator.walk_cost(60), 120_00);
        assert_eq!(calculator.wait_cost(60), 60_00);
        assert_eq!(calculator.calculate_min_cost(600, 1), 600_00 + 720_00 + 600_00);
    }
}
