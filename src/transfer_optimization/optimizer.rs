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

use std::time::Instant;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cost::{Cost, CostCalculator};
use crate::error::RaptorError;
use crate::path::{Path, TransitLeg};
use crate::request::{Deadline, SearchRequest, SlackParams, TransferOptimizationParams};
use crate::transit_data::TransitDataProvider;

use super::optimized_path::{OptimizedPath, TransferCosts};
use super::path_tail::{OptimizedPathTail, TailCostParams};
use super::transfer_generator::TransferGenerator;
use super::wait_time_cost::{min_safe_transfer_time, TransferWaitTimeCostCalculator};

/// Chooses where the transfers of the paths found by the search take place.
///
/// Each path is rebuilt from its last ride toward its first one. For every
/// possible transfer toward a ride, only the best tail that can follow it is kept,
/// the best being the one with the lowest
/// - transfer priority cost,
/// - then wait-time optimized cost, when enabled,
/// - then generalized cost.
pub struct OptimizePathService<'data, Data> {
    generator: TransferGenerator<'data, Data>,
    calculator: CostCalculator,
    slacks: SlackParams,
    params: TransferOptimizationParams,
}

impl<'data, Data> OptimizePathService<'data, Data>
where
    Data: TransitDataProvider,
{
    pub fn new(data: &'data Data, request: &SearchRequest) -> Self {
        Self {
            generator: TransferGenerator::new(data, request),
            calculator: CostCalculator::new(&request.cost_params),
            slacks: request.slacks,
            params: request.transfer_optimization.clone(),
        }
    }

    /// Optimize all `paths` in parallel, dropping the duplicates.
    pub fn optimize(
        &self,
        paths: &[Path<'data>],
        deadline: &Deadline,
    ) -> Result<Vec<OptimizedPath<'data>>, RaptorError> {
        let timer = Instant::now();
        let optimized: Vec<OptimizedPath<'data>> = paths
            .par_iter()
            .map(|path| {
                deadline.check("transfer optimization")?;
                self.optimize_path(path)
            })
            .collect::<Result<_, _>>()?;

        let nb_of_optimized = optimized.len();
        let result: Vec<OptimizedPath<'data>> = optimized
            .into_iter()
            .unique_by(|optimized| optimized.path().to_string())
            .collect();
        debug!(
            "{} paths optimized in {} ms, {} duplicates removed",
            nb_of_optimized,
            timer.elapsed().as_millis(),
            nb_of_optimized - result.len()
        );
        Ok(result)
    }

    pub fn optimize_path(&self, path: &Path<'data>) -> Result<OptimizedPath<'data>, RaptorError> {
        let wait_time_calculator = if self.params.optimize_transfer_wait_time {
            let mut calculator = TransferWaitTimeCostCalculator::from_params(&self.params);
            calculator.set_min_safe_transfer_time(min_safe_transfer_time(
                path.nb_of_transit_legs(),
                &self.params,
            ));
            Some(calculator)
        } else {
            None
        };
        let costs = TailCostParams {
            calculator: &self.calculator,
            slacks: &self.slacks,
            wait_time_calculator: wait_time_calculator.as_ref(),
        };

        let transit_legs: Vec<TransitLeg<'data>> = path.transit_legs().copied().collect();
        if !self.params.optimize_transfers || transit_legs.len() < 2 {
            return OptimizedPath::new(path.clone(), costs.wait_time_calculator);
        }

        let possible_transfers = self.generator.find_all_possible_transfers(&transit_legs);
        if possible_transfers.iter().any(Vec::is_empty) {
            // the path found by the search is always feasible, unless the data changed
            debug!("No transfer found for the path {}, it is kept as is.", path);
            return OptimizedPath::new(path.clone(), costs.wait_time_calculator);
        }

        let mut tails = match OptimizedPathTail::new(path, &costs)? {
            Some(tail) => vec![tail],
            None => return OptimizedPath::new(path.clone(), costs.wait_time_calculator),
        };

        for (from_leg, transfers) in transit_legs.iter().zip(possible_transfers.iter()).rev() {
            let mut new_tails = Vec::with_capacity(transfers.len());
            for transfer in transfers {
                let candidates = tails
                    .iter()
                    .filter(|tail| tail.can_board_head_at(transfer.to.position));
                if let Some(best) = self.filter_chain(candidates).into_iter().next() {
                    let mut tail = best.mutate();
                    tail.add_transit_and_transfer_leg(from_leg, transfer, &costs)?;
                    trace!("Tail kept for the transfer {} : {}", transfer, tail);
                    new_tails.push(tail);
                }
            }
            tails = new_tails;
        }

        let optimized: Vec<OptimizedPath<'data>> = tails
            .into_iter()
            .map(|tail| tail.insert_access(path, &costs))
            .collect::<Result<_, _>>()?;
        match self.filter_chain(optimized.iter()).into_iter().next() {
            Some(best) => Ok(best.clone()),
            None => OptimizedPath::new(path.clone(), costs.wait_time_calculator),
        }
    }

    // keeps the ties, in the order of `candidates`
    fn filter_chain<'a, T>(&self, candidates: impl Iterator<Item = &'a T>) -> Vec<&'a T>
    where
        T: TransferCosts + 'a,
    {
        let candidates = keep_minimal(candidates.collect(), |tail| tail.transfer_priority_cost());
        let candidates = if self.params.optimize_transfer_wait_time {
            keep_minimal(candidates, |tail| tail.wait_time_optimized_cost())
        } else {
            candidates
        };
        keep_minimal(candidates, |tail| tail.generalized_cost())
    }
}

fn keep_minimal<T, F>(candidates: Vec<T>, cost: F) -> Vec<T>
where
    F: Fn(&T) -> Cost,
{
    let min = match candidates.iter().map(&cost).min() {
        Some(min) => min,
        None => return candidates,
    };
    candidates
        .into_iter()
        .filter(|candidate| cost(candidate) == min)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained_transfer::TransferConstraint;
    use crate::engine;
    use crate::path::PathLeg;
    use crate::request::AccessEgress;
    use crate::search_direction::SearchDirection;
    use crate::transit_data::builder::{stop, trip_pos, AsDate, TransitDataBuilder};
    use crate::transit_data::TransitData;

    //        A      B      C      D
    // T1   10:00  10:10  10:20
    // T2          10:15  10:25  10:35
    fn builder() -> TransitDataBuilder {
        TransitDataBuilder::default()
            .route("L1", |r| {
                r.trip("T1", |t| {
                    t.st("A", "10:00").st("B", "10:10").st("C", "10:20");
                });
            })
            .route("L2", |r| {
                r.trip("T2", |t| {
                    t.st("B", "10:15").st("C", "10:25").st("D", "10:35");
                });
            })
    }

    fn request(data: &TransitData) -> SearchRequest {
        let stop = |name: &str| data.stop_idx(name).unwrap();
        let mut request = SearchRequest::new(
            "2020-01-01".as_date(),
            SearchDirection::Forward,
            10 * 3600,
            vec![AccessEgress::walking(stop("A"), 0, 0)],
            vec![AccessEgress::walking(stop("D"), 0, 0)],
        );
        request.slacks = SlackParams {
            board_slack: 0,
            alight_slack: 0,
            transfer_slack: 0,
        };
        request
    }

    fn transit<'data>(data: &'data TransitData, trip: &str, board: usize, alight: usize) -> TransitLeg<'data> {
        let trip = data.trip(trip).unwrap();
        let pattern = data.pattern(trip.pattern());
        TransitLeg {
            trip,
            board_position: board,
            alight_position: alight,
            board_stop: pattern.stop(board),
            alight_stop: pattern.stop(alight),
            constraint: TransferConstraint::Regular,
        }
    }

    // T1 from A to `transfer_stop`, then T2 to D
    fn path_through<'data>(data: &'data TransitData, request: &SearchRequest, transfer_stop: &str) -> Path<'data> {
        let (t1_alight, t2_board) = match transfer_stop {
            "B" => (1, 0),
            _ => (2, 1),
        };
        Path::new(
            request.access[0],
            vec![
                PathLeg::Transit(transit(data, "T1", 0, t1_alight)),
                PathLeg::Transit(transit(data, "T2", t2_board, 2)),
            ],
            request.egress[0],
            &request.slacks,
            &CostCalculator::new(&request.cost_params),
            request.search_time,
        )
    }

    fn transfer_stop<'data>(data: &'data TransitData, optimized: &OptimizedPath<'data>) -> (String, TransferConstraint) {
        let legs: Vec<&TransitLeg> = optimized.path().transit_legs().collect();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].alight_stop, legs[1].board_stop);
        (data.stop_name(legs[0].alight_stop).to_string(), legs[1].constraint)
    }

    #[test]
    fn stay_seated_transfer_is_preferred() {
        let data = builder()
            .constrained_transfer(trip_pos("T1", 2), trip_pos("T2", 1), TransferConstraint::StaySeated)
            .build();
        let request = request(&data);
        let service = OptimizePathService::new(&data, &request);

        let optimized = service.optimize_path(&path_through(&data, &request, "B")).unwrap();

        assert_eq!(
            transfer_stop(&data, &optimized),
            ("C".to_string(), TransferConstraint::StaySeated)
        );
        assert_eq!(optimized.transfer_priority_cost(), 10_00);
    }

    #[test]
    fn longer_wait_is_preferred_when_wait_time_is_optimized() {
        //        A      B      C      D
        // T1   10:00  10:10  10:20
        // T2          10:11  10:22  10:35
        let data = TransitDataBuilder::default()
            .route("L1", |r| {
                r.trip("T1", |t| {
                    t.st("A", "10:00").st("B", "10:10").st("C", "10:20");
                });
            })
            .route("L2", |r| {
                r.trip("T2", |t| {
                    t.st("B", "10:11").st("C", "10:22").st("D", "10:35");
                });
            })
            .build();
        let mut request = request(&data);
        let path = path_through(&data, &request, "B");

        let optimized = OptimizePathService::new(&data, &request)
            .optimize_path(&path)
            .unwrap();
        assert_eq!(
            transfer_stop(&data, &optimized),
            ("C".to_string(), TransferConstraint::Regular)
        );

        // same generalized cost : the first transfer found is kept
        request.transfer_optimization.optimize_transfer_wait_time = false;
        let optimized = OptimizePathService::new(&data, &request)
            .optimize_path(&path)
            .unwrap();
        assert_eq!(
            transfer_stop(&data, &optimized),
            ("B".to_string(), TransferConstraint::Regular)
        );
        assert_eq!(optimized.wait_time_optimized_cost(), optimized.generalized_cost());
    }

    #[test]
    fn paths_are_kept_when_optimization_is_disabled() {
        let data = builder()
            .constrained_transfer(trip_pos("T1", 2), trip_pos("T2", 1), TransferConstraint::StaySeated)
            .build();
        let mut request = request(&data);
        request.transfer_optimization.optimize_transfers = false;
        let path = path_through(&data, &request, "B");

        let optimized = OptimizePathService::new(&data, &request)
            .optimize(&[path.clone(), path.clone()], &Deadline::new(None))
            .unwrap();

        assert_eq!(optimized.len(), 1);
        assert_eq!(optimized[0].path().to_string(), path.to_string());
    }

    #[test]
    fn not_allowed_transfer_at_one_stop_does_not_block_another() {
        let data = builder()
            .constrained_transfer(stop("B"), stop("B"), TransferConstraint::NotAllowed)
            .build();
        let request = request(&data);

        let result = engine::route(&data, &request).unwrap();
        assert!(!result.paths.is_empty());
        let optimized = OptimizePathService::new(&data, &request)
            .optimize(&result.paths, &Deadline::new(None))
            .unwrap();

        assert_eq!(optimized.len(), 1);
        assert_eq!(
            transfer_stop(&data, &optimized[0]),
            ("C".to_string(), TransferConstraint::Regular)
        );
        assert_eq!(optimized[0].path().end_time(), 10 * 3600 + 35 * 60);
    }
}
