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

use std::time::Duration;

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use raptor::{CostParams, PositiveDuration, SearchRequest, SlackParams, TransferOptimizationParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[structopt(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct RequestParams {
    /// maximum number of transfers in a journey
    #[structopt(long, default_value = DEFAULT_MAX_NB_OF_TRANSFERS)]
    #[serde(default = "default_max_nb_of_transfers")]
    pub max_nb_of_transfers: u8,

    /// journeys departing (or arriving for an arrival request)
    /// up to this duration after (before) the requested datetime are searched
    #[structopt(long, default_value = DEFAULT_SEARCH_WINDOW)]
    #[serde(default = "default_search_window")]
    pub search_window: PositiveDuration,

    /// duration between two Range-Raptor iterations in the search window
    #[structopt(long, default_value = DEFAULT_ITERATION_STEP)]
    #[serde(default = "default_iteration_step")]
    pub iteration_step: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_BOARD_SLACK)]
    #[serde(default = "default_board_slack")]
    pub board_slack: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_ALIGHT_SLACK)]
    #[serde(default = "default_alight_slack")]
    pub alight_slack: PositiveDuration,

    /// minimum time between alighting a trip and boarding another one
    #[structopt(long, default_value = DEFAULT_TRANSFER_SLACK)]
    #[serde(default = "default_transfer_slack")]
    pub transfer_slack: PositiveDuration,

    /// cost of each boarding
    #[structopt(long, default_value = DEFAULT_BOARD_COST)]
    #[serde(default = "default_board_cost")]
    pub board_cost: PositiveDuration,

    /// extra cost of each boarding after the first one
    #[structopt(long, default_value = DEFAULT_TRANSFER_COST)]
    #[serde(default = "default_transfer_cost")]
    pub transfer_cost: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_WAIT_RELUCTANCE)]
    #[serde(default = "default_wait_reluctance")]
    pub wait_reluctance: f64,

    #[structopt(long, default_value = DEFAULT_WALK_RELUCTANCE)]
    #[serde(default = "default_walk_reluctance")]
    pub walk_reluctance: f64,

    /// reluctance of riding a trip, applied to every route
    #[structopt(long, default_value = DEFAULT_TRANSIT_RELUCTANCE)]
    #[serde(default = "default_transit_reluctance")]
    pub transit_reluctance: f64,

    /// apply guaranteed, stay-seated, minimum time and forbidden transfers
    #[structopt(long, parse(try_from_str), default_value = DEFAULT_ENABLE_TRANSFER_CONSTRAINTS)]
    #[serde(default = "default_enable_transfer_constraints")]
    pub enable_transfer_constraints: bool,

    /// when false, a minimum transfer time cannot be shorter than the regular slacks
    #[structopt(long, parse(try_from_str), default_value = DEFAULT_MINIMUM_TRANSFER_TIME_IS_DEFINITIVE)]
    #[serde(default = "default_minimum_transfer_time_is_definitive")]
    pub minimum_transfer_time_is_definitive: bool,

    #[structopt(long, parse(try_from_str), default_value = DEFAULT_OPTIMIZE_TRANSFERS)]
    #[serde(default = "default_optimize_transfers")]
    pub optimize_transfers: bool,

    #[structopt(long, parse(try_from_str), default_value = DEFAULT_OPTIMIZE_TRANSFER_WAIT_TIME)]
    #[serde(default = "default_optimize_transfer_wait_time")]
    pub optimize_transfer_wait_time: bool,

    /// the cost of a transfer without wait is this factor times the min safe transfer time
    #[structopt(long, default_value = DEFAULT_MIN_SAFE_WAIT_TIME_FACTOR)]
    #[serde(default = "default_min_safe_wait_time_factor")]
    pub min_safe_wait_time_factor: f64,

    #[structopt(long, default_value = DEFAULT_BACK_TRAVEL_WAIT_TIME_FACTOR)]
    #[serde(default = "default_back_travel_wait_time_factor")]
    pub back_travel_wait_time_factor: f64,

    #[structopt(long, default_value = DEFAULT_MIN_SAFE_TRANSFER_TIME_PER_LEG)]
    #[serde(default = "default_min_safe_transfer_time_per_leg")]
    pub min_safe_transfer_time_per_leg: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_MIN_SAFE_TRANSFER_TIME_LOWER_BOUND)]
    #[serde(default = "default_min_safe_transfer_time_lower_bound")]
    pub min_safe_transfer_time_lower_bound: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_MIN_SAFE_TRANSFER_TIME_UPPER_BOUND)]
    #[serde(default = "default_min_safe_transfer_time_upper_bound")]
    pub min_safe_transfer_time_upper_bound: PositiveDuration,

    /// abort a search lasting longer than this
    #[structopt(long, default_value = DEFAULT_TIMEOUT)]
    #[serde(default = "default_timeout")]
    pub timeout: PositiveDuration,

    /// number of chunks of the search window searched in parallel
    #[structopt(long, default_value = DEFAULT_PARALLEL_CHUNKS)]
    #[serde(default = "default_parallel_chunks")]
    pub parallel_chunks: usize,
}

pub const DEFAULT_MAX_NB_OF_TRANSFERS: &str = "10";
pub const DEFAULT_SEARCH_WINDOW: &str = "00:30:00";
pub const DEFAULT_ITERATION_STEP: &str = "00:01:00";
pub const DEFAULT_BOARD_SLACK: &str = "00:00:00";
pub const DEFAULT_ALIGHT_SLACK: &str = "00:00:00";
pub const DEFAULT_TRANSFER_SLACK: &str = "00:01:00";
pub const DEFAULT_BOARD_COST: &str = "00:10:00";
pub const DEFAULT_TRANSFER_COST: &str = "00:00:00";
pub const DEFAULT_WAIT_RELUCTANCE: &str = "1.0";
pub const DEFAULT_WALK_RELUCTANCE: &str = "2.0";
pub const DEFAULT_TRANSIT_RELUCTANCE: &str = "1.0";
pub const DEFAULT_ENABLE_TRANSFER_CONSTRAINTS: &str = "true";
pub const DEFAULT_MINIMUM_TRANSFER_TIME_IS_DEFINITIVE: &str = "false";
pub const DEFAULT_OPTIMIZE_TRANSFERS: &str = "true";
pub const DEFAULT_OPTIMIZE_TRANSFER_WAIT_TIME: &str = "true";
pub const DEFAULT_MIN_SAFE_WAIT_TIME_FACTOR: &str = "5.0";
pub const DEFAULT_BACK_TRAVEL_WAIT_TIME_FACTOR: &str = "1.0";
pub const DEFAULT_MIN_SAFE_TRANSFER_TIME_PER_LEG: &str = "00:01:00";
pub const DEFAULT_MIN_SAFE_TRANSFER_TIME_LOWER_BOUND: &str = "00:00:40";
pub const DEFAULT_MIN_SAFE_TRANSFER_TIME_UPPER_BOUND: &str = "00:20:00";
pub const DEFAULT_TIMEOUT: &str = "00:00:30";
pub const DEFAULT_PARALLEL_CHUNKS: &str = "1";

pub fn default_max_nb_of_transfers() -> u8 {
    10
}

pub fn default_search_window() -> PositiveDuration {
    PositiveDuration::from_hms(0, 30, 0)
}

pub fn default_iteration_step() -> PositiveDuration {
    PositiveDuration::from_hms(0, 1, 0)
}

pub fn default_board_slack() -> PositiveDuration {
    PositiveDuration::zero()
}

pub fn default_alight_slack() -> PositiveDuration {
    PositiveDuration::zero()
}

pub fn default_transfer_slack() -> PositiveDuration {
    PositiveDuration::from_hms(0, 1, 0)
}

pub fn default_board_cost() -> PositiveDuration {
    PositiveDuration::from_hms(0, 10, 0)
}

pub fn default_transfer_cost() -> PositiveDuration {
    PositiveDuration::zero()
}

pub fn default_wait_reluctance() -> f64 {
    1.0
}

pub fn default_walk_reluctance() -> f64 {
    2.0
}

pub fn default_transit_reluctance() -> f64 {
    1.0
}

pub fn default_enable_transfer_constraints() -> bool {
    true
}

pub fn default_minimum_transfer_time_is_definitive() -> bool {
    false
}

pub fn default_optimize_transfers() -> bool {
    true
}

pub fn default_optimize_transfer_wait_time() -> bool {
    true
}

pub fn default_min_safe_wait_time_factor() -> f64 {
    5.0
}

pub fn default_back_travel_wait_time_factor() -> f64 {
    1.0
}

pub fn default_min_safe_transfer_time_per_leg() -> PositiveDuration {
    PositiveDuration::from_hms(0, 1, 0)
}

pub fn default_min_safe_transfer_time_lower_bound() -> PositiveDuration {
    PositiveDuration::from_seconds(40)
}

pub fn default_min_safe_transfer_time_upper_bound() -> PositiveDuration {
    PositiveDuration::from_hms(0, 20, 0)
}

pub fn default_timeout() -> PositiveDuration {
    PositiveDuration::from_seconds(30)
}

pub fn default_parallel_chunks() -> usize {
    1
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            max_nb_of_transfers: default_max_nb_of_transfers(),
            search_window: default_search_window(),
            iteration_step: default_iteration_step(),
            board_slack: default_board_slack(),
            alight_slack: default_alight_slack(),
            transfer_slack: default_transfer_slack(),
            board_cost: default_board_cost(),
            transfer_cost: default_transfer_cost(),
            wait_reluctance: default_wait_reluctance(),
            walk_reluctance: default_walk_reluctance(),
            transit_reluctance: default_transit_reluctance(),
            enable_transfer_constraints: default_enable_transfer_constraints(),
            minimum_transfer_time_is_definitive: default_minimum_transfer_time_is_definitive(),
            optimize_transfers: default_optimize_transfers(),
            optimize_transfer_wait_time: default_optimize_transfer_wait_time(),
            min_safe_wait_time_factor: default_min_safe_wait_time_factor(),
            back_travel_wait_time_factor: default_back_travel_wait_time_factor(),
            min_safe_transfer_time_per_leg: default_min_safe_transfer_time_per_leg(),
            min_safe_transfer_time_lower_bound: default_min_safe_transfer_time_lower_bound(),
            min_safe_transfer_time_upper_bound: default_min_safe_transfer_time_upper_bound(),
            timeout: default_timeout(),
            parallel_chunks: default_parallel_chunks(),
        }
    }
}

impl RequestParams {
    pub fn slacks(&self) -> SlackParams {
        SlackParams {
            board_slack: self.board_slack.as_time(),
            alight_slack: self.alight_slack.as_time(),
            transfer_slack: self.transfer_slack.as_time(),
        }
    }

    pub fn cost_params(&self) -> CostParams {
        CostParams {
            board_cost: self.board_cost.as_time(),
            transfer_cost: self.transfer_cost.as_time(),
            wait_reluctance: self.wait_reluctance,
            walk_reluctance: self.walk_reluctance,
            transit_reluctance: vec![self.transit_reluctance],
            stop_costs: None,
        }
    }

    pub fn transfer_optimization(&self) -> TransferOptimizationParams {
        TransferOptimizationParams {
            optimize_transfers: self.optimize_transfers,
            optimize_transfer_wait_time: self.optimize_transfer_wait_time,
            min_safe_wait_time_factor: self.min_safe_wait_time_factor,
            back_travel_wait_time_factor: self.back_travel_wait_time_factor,
            min_safe_transfer_time_per_leg: self.min_safe_transfer_time_per_leg.as_time(),
            min_safe_transfer_time_lower_bound: self.min_safe_transfer_time_lower_bound.as_time(),
            min_safe_transfer_time_upper_bound: self.min_safe_transfer_time_upper_bound.as_time(),
        }
    }

    /// Set everything but the date, times and places of `request`.
    /// A null timeout means no timeout at all.
    pub fn apply_to(&self, request: &mut SearchRequest) {
        request.max_number_of_transfers = self.max_nb_of_transfers;
        request.search_window = self.search_window.as_time();
        request.iteration_step = self.iteration_step.as_time();
        request.slacks = self.slacks();
        request.cost_params = self.cost_params();
        request.enable_transfer_constraints = self.enable_transfer_constraints;
        request.minimum_transfer_time_is_definitive = self.minimum_transfer_time_is_definitive;
        request.transfer_optimization = self.transfer_optimization();
        request.timeout = if self.timeout == PositiveDuration::zero() {
            None
        } else {
            Some(Duration::from_secs(self.timeout.total_seconds()))
        };
        request.parallel_chunks = self.parallel_chunks.max(1);
    }
}
