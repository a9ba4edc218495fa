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

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::cost::{Cost, CostParams};
use crate::error::RaptorError;
use crate::search_direction::SearchDirection;
use crate::time::Time;
use crate::transit_data::{StopIdx, TransitDataProvider};

/// A leg between the origin (or destination) and a stop, computed outside of the engine.
///
/// A walking leg can only be combined with a transit leg,
/// while an `on_board` leg (flex, taxi) rides by itself and counts as a boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessEgress {
    pub stop: StopIdx,
    pub duration: Time,
    pub cost: Cost,
    pub on_board: bool,
}

impl AccessEgress {
    pub fn walking(stop: StopIdx, duration: Time, cost: Cost) -> Self {
        Self {
            stop,
            duration,
            cost,
            on_board: false,
        }
    }

    pub fn on_board(stop: StopIdx, duration: Time, cost: Cost) -> Self {
        Self {
            stop,
            duration,
            cost,
            on_board: true,
        }
    }
}

/// Build walking legs from stop names, ignoring (with a warning) the unknown ones.
pub fn walking_legs<Data: TransitDataProvider>(
    data: &Data,
    stops: &[(&str, Time)],
    walk_cost: impl Fn(Time) -> Cost,
) -> Vec<AccessEgress> {
    stops
        .iter()
        .filter_map(|(name, duration)| match data.stop_idx(name) {
            Some(stop) => Some(AccessEgress::walking(stop, *duration, walk_cost(*duration))),
            None => {
                warn!("The stop {} is not found in the transit data. I ignore it.", name);
                None
            }
        })
        .collect()
}

/// Slacks, in seconds, as experienced by the traveler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackParams {
    pub board_slack: Time,
    pub alight_slack: Time,
    pub transfer_slack: Time,
}

impl Default for SlackParams {
    fn default() -> Self {
        Self {
            board_slack: 0,
            alight_slack: 0,
            transfer_slack: 60,
        }
    }
}

impl SlackParams {
    /// Slack applied before "boarding" in the sense of `direction`.
    /// In a reverse search we board at the stop where the traveler alights.
    pub fn search_board_slack(&self, direction: SearchDirection) -> Time {
        match direction {
            SearchDirection::Forward => self.board_slack,
            SearchDirection::Reverse => self.alight_slack,
        }
    }

    pub fn search_alight_slack(&self, direction: SearchDirection) -> Time {
        match direction {
            SearchDirection::Forward => self.alight_slack,
            SearchDirection::Reverse => self.board_slack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOptimizationParams {
    pub optimize_transfers: bool,
    pub optimize_transfer_wait_time: bool,
    pub min_safe_wait_time_factor: f64,
    pub back_travel_wait_time_factor: f64,
    pub min_safe_transfer_time_per_leg: Time,
    pub min_safe_transfer_time_lower_bound: Time,
    pub min_safe_transfer_time_upper_bound: Time,
}

impl Default for TransferOptimizationParams {
    fn default() -> Self {
        Self {
            optimize_transfers: true,
            optimize_transfer_wait_time: true,
            min_safe_wait_time_factor: 5.0,
            back_travel_wait_time_factor: 1.0,
            min_safe_transfer_time_per_leg: 60,
            min_safe_transfer_time_lower_bound: 40,
            min_safe_transfer_time_upper_bound: 20 * 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// day of the service
    pub date: NaiveDate,
    pub direction: SearchDirection,
    /// earliest departure in a forward search, latest arrival in a reverse search
    pub search_time: Time,
    /// departures (or arrivals) are considered in
    /// `[search_time, search_time + search_window]` for a forward search,
    /// and `[search_time - search_window, search_time]` for a reverse one
    pub search_window: Time,
    pub iteration_step: Time,
    pub max_number_of_transfers: u8,
    /// legs from the origin
    pub access: Vec<AccessEgress>,
    /// legs toward the destination
    pub egress: Vec<AccessEgress>,
    pub slacks: SlackParams,
    pub cost_params: CostParams,
    pub enable_transfer_constraints: bool,
    pub minimum_transfer_time_is_definitive: bool,
    pub transfer_optimization: TransferOptimizationParams,
    pub timeout: Option<Duration>,
    pub parallel_chunks: usize,
}

impl SearchRequest {
    pub fn new(
        date: NaiveDate,
        direction: SearchDirection,
        search_time: Time,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            date,
            direction,
            search_time,
            search_window: 0,
            iteration_step: 60,
            max_number_of_transfers: 10,
            access,
            egress,
            slacks: SlackParams::default(),
            cost_params: CostParams::default(),
            enable_transfer_constraints: true,
            minimum_transfer_time_is_definitive: false,
            transfer_optimization: TransferOptimizationParams::default(),
            timeout: None,
            parallel_chunks: 1,
        }
    }

    pub fn max_number_of_rounds(&self) -> u8 {
        self.max_number_of_transfers.saturating_add(1)
    }

    /// Legs where the search starts, in the search sense
    pub fn search_access(&self) -> &[AccessEgress] {
        match self.direction {
            SearchDirection::Forward => &self.access,
            SearchDirection::Reverse => &self.egress,
        }
    }

    /// Legs where the search ends, in the search sense
    pub fn search_egress(&self) -> &[AccessEgress] {
        match self.direction {
            SearchDirection::Forward => &self.egress,
            SearchDirection::Reverse => &self.access,
        }
    }

    /// Start times of the Range-Raptor iterations, in the order they must be run :
    /// the iteration nearest to the end of the window in the search sense comes first.
    pub fn iteration_times(&self) -> Vec<Time> {
        let step = self.iteration_step.max(1);
        let window = self.search_window.max(0);
        let nb_of_steps = window / step;
        match self.direction {
            SearchDirection::Forward => (0..=nb_of_steps)
                .rev()
                .map(|nb| self.search_time + nb * step)
                .collect(),
            SearchDirection::Reverse => (0..=nb_of_steps)
                .rev()
                .map(|nb| self.search_time - nb * step)
                .collect(),
        }
    }
}

/// Time budget of one search.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn check(&self, phase: &'static str) -> Result<(), RaptorError> {
        match self.limit {
            Some(limit) if self.start.elapsed() > limit => Err(RaptorError::Timeout {
                phase,
                elapsed: self.start.elapsed(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}
