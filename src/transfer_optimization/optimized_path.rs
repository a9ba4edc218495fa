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
use crate::cost::{to_raptor_cost, Cost};
use crate::error::RaptorError;
use crate::path::{Path, PathLeg};
use crate::time::Time;

use super::wait_time_cost::TransferWaitTimeCostCalculator;

/// The criteria used to pick the best transfers, lower is better.
pub trait TransferCosts {
    fn generalized_cost(&self) -> Cost;

    /// Favors stay-seated, then guaranteed transfers
    fn transfer_priority_cost(&self) -> Cost;

    fn wait_time_optimized_cost(&self) -> Cost;
}

/// A path whose transfers were chosen by the transfer optimization
#[derive(Debug, Clone)]
pub struct OptimizedPath<'data> {
    path: Path<'data>,
    transfer_priority_cost: Cost,
    wait_time_optimized_cost: Cost,
}

impl<'data> OptimizedPath<'data> {
    /// `wait_time_calculator` is `None` when the wait time is not optimized,
    /// the wait-time optimized cost is then the generalized cost.
    pub fn new(
        path: Path<'data>,
        wait_time_calculator: Option<&TransferWaitTimeCostCalculator>,
    ) -> Result<Self, RaptorError> {
        let (transfer_priority_cost, wait_cost) = transfers_costs(path.legs(), wait_time_calculator)?;
        let wait_time_optimized_cost = path.cost() + wait_cost;
        Ok(Self {
            path,
            transfer_priority_cost,
            wait_time_optimized_cost,
        })
    }

    pub fn path(&self) -> &Path<'data> {
        &self.path
    }

    pub fn into_path(self) -> Path<'data> {
        self.path
    }
}

impl<'data> TransferCosts for OptimizedPath<'data> {
    fn generalized_cost(&self) -> Cost {
        self.path.cost()
    }

    fn transfer_priority_cost(&self) -> Cost {
        self.transfer_priority_cost
    }

    fn wait_time_optimized_cost(&self) -> Cost {
        self.wait_time_optimized_cost
    }
}

impl<'data> Display for OptimizedPath<'data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [P{} W{}]",
            self.path, self.transfer_priority_cost, self.wait_time_optimized_cost
        )
    }
}

/// Priority cost and wait cost of the transfers between the rides of `legs`.
///
/// The constraint of a ride is the one of the transfer toward it,
/// so the first ride of `legs` does not count.
pub(crate) fn transfers_costs<'a, 'data: 'a>(
    legs: impl IntoIterator<Item = &'a PathLeg<'data>>,
    wait_time_calculator: Option<&TransferWaitTimeCostCalculator>,
) -> Result<(Cost, Cost), RaptorError> {
    let mut priority_cost = 0;
    let mut wait_cost = 0;
    let mut prev_alight_time: Option<Time> = None;
    let mut walk_duration = 0;
    for leg in legs {
        match leg {
            PathLeg::Transit(transit) => {
                if let Some(alight_time) = prev_alight_time {
                    priority_cost += transit.constraint.priority_cost();
                    if let Some(calculator) = wait_time_calculator {
                        wait_cost += match transit.constraint {
                            TransferConstraint::StaySeated => calculator.calculate_stay_seated_transfer_cost(),
                            TransferConstraint::Guaranteed => calculator.calculate_guaranteed_transfer_cost(),
                            _ => {
                                let wait_time = transit.board_time() - alight_time - walk_duration;
                                to_raptor_cost(calculator.calculate_optimized_wait_cost(wait_time)?)
                            }
                        };
                    }
                }
                prev_alight_time = Some(transit.alight_time());
                walk_duration = 0;
            }
            PathLeg::Transfer(transfer) => walk_duration += transfer.duration,
        }
    }
    Ok((priority_cost, wait_cost))
}
