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

use std::convert::TryFrom;

use crate::cost::Cost;
use crate::error::RaptorError;
use crate::request::TransferOptimizationParams;
use crate::time::Time;

// fixed costs of facilitated transfers, low enough to win against any wait cost
const STAY_SEATED_TRANSFER_COST: Cost = -10_000_000;
const GUARANTEED_TRANSFER_COST: Cost = -5_000_000;

/// Cost of the time waited during a transfer, used to spread the transfer time
/// between short, unsafe transfers and long ones.
///
/// With `t0` the minimum safe transfer time and `n` the min-safe-wait-time factor,
/// the cost of waiting `t` seconds is
///
/// ```text
/// f(t) = n * t0 / (1 + (n - 1) * ln(1 + (e - 1) * t / t0))
/// ```
///
/// so that `f(0) = n * t0` and `f(t0) = t0`, to which is added `-back_travel_factor * t`
/// to favor transfers that do not travel back toward the origin.
#[derive(Debug, Clone)]
pub struct TransferWaitTimeCostCalculator {
    back_travel_wait_time_factor: f64,
    min_safe_wait_time_factor: f64,
    min_safe_transfer_time: Option<f64>,
}

impl TransferWaitTimeCostCalculator {
    pub fn new(back_travel_wait_time_factor: f64, min_safe_wait_time_factor: f64) -> Self {
        Self {
            back_travel_wait_time_factor,
            min_safe_wait_time_factor,
            min_safe_transfer_time: None,
        }
    }

    pub fn from_params(params: &TransferOptimizationParams) -> Self {
        Self::new(params.back_travel_wait_time_factor, params.min_safe_wait_time_factor)
    }

    /// `t0`, in seconds. Must be called before any wait cost is computed.
    pub fn set_min_safe_transfer_time(&mut self, min_safe_transfer_time: Time) {
        self.min_safe_transfer_time = Some(f64::from(min_safe_transfer_time));
    }

    /// Cost, in seconds, of waiting `wait_time` seconds during a transfer
    pub fn calculate_optimized_wait_cost(&self, wait_time: Time) -> Result<f64, RaptorError> {
        Ok(self.avoid_short_wait_time_cost(wait_time)? + self.avoid_back_travel_cost(wait_time))
    }

    pub fn avoid_short_wait_time_cost(&self, wait_time: Time) -> Result<f64, RaptorError> {
        let t0 = self
            .min_safe_transfer_time
            .ok_or(RaptorError::MinSafeTransferTimeNotSet)?;
        let n = self.min_safe_wait_time_factor;
        let t = f64::from(wait_time);
        let e = std::f64::consts::E;
        Ok(n * t0 / (1.0 + (n - 1.0) * (1.0 + (e - 1.0) * t / t0).ln()))
    }

    pub fn avoid_back_travel_cost(&self, wait_time: Time) -> f64 {
        -self.back_travel_wait_time_factor * f64::from(wait_time)
    }

    pub fn calculate_stay_seated_transfer_cost(&self) -> Cost {
        STAY_SEATED_TRANSFER_COST
    }

    pub fn calculate_guaranteed_transfer_cost(&self) -> Cost {
        GUARANTEED_TRANSFER_COST
    }
}

/// `value` clamped into `[lower, upper]`
pub fn bound<T: PartialOrd>(value: T, lower: T, upper: T) -> T {
    if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}

/// `t0` for a path with `nb_of_transit_legs` rides
pub fn min_safe_transfer_time(nb_of_transit_legs: usize, params: &TransferOptimizationParams) -> Time {
    let nb_of_legs = Time::try_from(nb_of_transit_legs).unwrap_or(Time::MAX);
    bound(
        nb_of_legs.saturating_mul(params.min_safe_transfer_time_per_leg),
        params.min_safe_transfer_time_lower_bound,
        params.min_safe_transfer_time_upper_bound,
    )
}
