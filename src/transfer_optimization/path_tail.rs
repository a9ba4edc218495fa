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

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

use crate::cost::{Cost, CostCalculator};
use crate::error::RaptorError;
use crate::path::{Path, PathLeg, TransferLeg, TransitLeg};
use crate::request::{AccessEgress, SlackParams};
use crate::time::{format_duration_short, format_time_short, Time};

use super::optimized_path::{transfers_costs, OptimizedPath, TransferCosts};
use super::transfer_generator::TripToTripTransfer;
use super::wait_time_cost::TransferWaitTimeCostCalculator;

/// What is needed to compute the costs of a tail
#[derive(Clone, Copy)]
pub struct TailCostParams<'a> {
    pub calculator: &'a CostCalculator,
    pub slacks: &'a SlackParams,
    /// `None` when the wait time is not optimized
    pub wait_time_calculator: Option<&'a TransferWaitTimeCostCalculator>,
}

/// The end of a path being rebuilt, from its destination toward its origin.
///
/// The first leg, the head, is always a ride. Its boarding is not decided yet :
/// it is set when the ride before it is added, or when the access is inserted.
/// Costs cover everything after the boarding of the head.
#[derive(Debug, Clone)]
pub struct OptimizedPathTail<'data> {
    legs: VecDeque<PathLeg<'data>>,
    egress: AccessEgress,
    generalized_cost: Cost,
    transfer_priority_cost: Cost,
    wait_time_optimized_cost: Cost,
}

impl<'data> OptimizedPathTail<'data> {
    /// The tail made of the last ride of `path` and the legs after it.
    /// `None` if `path` has no ride.
    pub fn new(path: &Path<'data>, costs: &TailCostParams) -> Result<Option<Self>, RaptorError> {
        let last_transit = path
            .legs()
            .iter()
            .rposition(|leg| matches!(leg, PathLeg::Transit(_)));
        let last_transit = match last_transit {
            Some(last_transit) => last_transit,
            None => return Ok(None),
        };
        let mut tail = Self {
            legs: path.legs()[last_transit..].iter().copied().collect(),
            egress: path.egress().leg,
            generalized_cost: 0,
            transfer_priority_cost: 0,
            wait_time_optimized_cost: 0,
        };
        tail.update_costs(costs)?;
        Ok(Some(tail))
    }

    /// A copy that can be extended without changing `self`
    pub fn mutate(&self) -> Self {
        self.clone()
    }

    pub fn head(&self) -> Option<&TransitLeg<'data>> {
        match self.legs.front() {
            Some(PathLeg::Transit(head)) => Some(head),
            _ => None,
        }
    }

    /// The head must be left after it is boarded
    pub fn can_board_head_at(&self, position: usize) -> bool {
        self.head()
            .map_or(false, |head| position < head.alight_position)
    }

    pub fn legs(&self) -> impl Iterator<Item = &PathLeg<'data>> + '_ {
        self.legs.iter()
    }

    /// Prepend `leg`, left where `transfer` starts, and the walk of `transfer`.
    /// The current head is boarded where `transfer` ends.
    pub fn add_transit_and_transfer_leg(
        &mut self,
        leg: &TransitLeg<'data>,
        transfer: &TripToTripTransfer<'data>,
        costs: &TailCostParams,
    ) -> Result<(), RaptorError> {
        if let Some(PathLeg::Transit(head)) = self.legs.front_mut() {
            head.board_position = transfer.to.position;
            head.board_stop = transfer.to.stop;
            head.constraint = transfer.constraint;
        }
        if let Some(walk) = transfer.transfer {
            self.legs.push_front(PathLeg::Transfer(TransferLeg::new(
                walk.from_stop,
                walk.to_stop,
                walk.duration,
            )));
        }
        let mut leg = *leg;
        leg.alight_position = transfer.from.position;
        leg.alight_stop = transfer.from.stop;
        self.legs.push_front(PathLeg::Transit(leg));
        self.update_costs(costs)
    }

    /// Complete the tail with the access part of `original`, the path it was rebuilt from.
    pub fn insert_access(
        self,
        original: &Path<'data>,
        costs: &TailCostParams,
    ) -> Result<OptimizedPath<'data>, RaptorError> {
        let mut legs: Vec<PathLeg<'data>> = original
            .legs()
            .iter()
            .take_while(|leg| matches!(leg, PathLeg::Transfer(_)))
            .copied()
            .collect();
        let mut tail_legs = self.legs;
        if let (Some(PathLeg::Transit(head)), Some(first)) =
            (tail_legs.front_mut(), original.transit_legs().next())
        {
            head.board_position = first.board_position;
            head.board_stop = first.board_stop;
            head.constraint = first.constraint;
        }
        legs.extend(tail_legs);
        let path = Path::new(
            original.access().leg,
            legs,
            self.egress,
            costs.slacks,
            costs.calculator,
            original.start_time(),
        );
        OptimizedPath::new(path, costs.wait_time_calculator)
    }

    fn update_costs(&mut self, costs: &TailCostParams) -> Result<(), RaptorError> {
        let calculator = costs.calculator;
        let alight_slack = costs.slacks.alight_slack;
        let mut generalized_cost = 0;
        // `None` on the head
        let mut arrival_time: Option<Time> = None;
        let mut last_alight_time = 0;
        for leg in self.legs.iter() {
            match leg {
                PathLeg::Transit(transit) => {
                    if let Some(arrival_time) = arrival_time {
                        let prev_arrival_time = if transit.constraint.is_facilitated() {
                            last_alight_time
                        } else {
                            arrival_time
                        };
                        generalized_cost += calculator.boarding_cost(
                            false,
                            prev_arrival_time,
                            transit.board_stop,
                            transit.board_time(),
                            transit.trip,
                            transit.constraint,
                        );
                    }
                    generalized_cost += calculator.transit_arrival_cost(
                        0,
                        alight_slack,
                        transit.duration(),
                        transit.trip,
                        transit.alight_stop,
                    );
                    last_alight_time = transit.alight_time();
                    arrival_time = Some(last_alight_time + alight_slack);
                }
                PathLeg::Transfer(transfer) => {
                    generalized_cost += calculator.walk_cost(transfer.duration);
                    arrival_time = arrival_time.map(|time| time + transfer.duration);
                }
            }
        }
        self.generalized_cost = generalized_cost + self.egress.cost;

        let (priority_cost, wait_cost) = transfers_costs(self.legs.iter(), costs.wait_time_calculator)?;
        self.transfer_priority_cost = priority_cost;
        self.wait_time_optimized_cost = self.generalized_cost + wait_cost;
        Ok(())
    }
}

impl<'data> TransferCosts for OptimizedPathTail<'data> {
    fn generalized_cost(&self) -> Cost {
        self.generalized_cost
    }

    fn transfer_priority_cost(&self) -> Cost {
        self.transfer_priority_cost
    }

    fn wait_time_optimized_cost(&self) -> Cost {
        self.wait_time_optimized_cost
    }
}

impl<'data> Display for OptimizedPathTail<'data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, leg) in self.legs.iter().enumerate() {
            if idx > 0 {
                write!(f, " ~ ")?;
            }
            match leg {
                PathLeg::Transit(transit) => write!(
                    f,
                    "{} {} {} ~ {}",
                    transit.trip.id(),
                    format_time_short(transit.board_time()),
                    format_time_short(transit.alight_time()),
                    transit.alight_stop
                )?,
                PathLeg::Transfer(transfer) => write!(
                    f,
                    "Walk {} ~ {}",
                    format_duration_short(transfer.duration),
                    transfer.to_stop
                )?,
            }
        }
        write!(
            f,
            " ~ {} {} [C{} P{} W{}]",
            if self.egress.on_board { "Ride" } else { "Walk" },
            format_duration_short(self.egress.duration),
            self.generalized_cost,
            self.transfer_priority_cost,
            self.wait_time_optimized_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constrained_transfer::TransferConstraint;
    use crate::transfer_optimization::transfer_generator::TripStopTime;
    use crate::transit_data::builder::TransitDataBuilder;
    use crate::transit_data::{TransitData, TransitDataProvider};

    fn data() -> TransitData {
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
            .build()
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

    fn transfer_at<'data>(
        data: &'data TransitData,
        from: &TransitLeg<'data>,
        from_position: usize,
        to: &TransitLeg<'data>,
        to_position: usize,
        constraint: TransferConstraint,
    ) -> TripToTripTransfer<'data> {
        let from_stop = data.pattern(from.trip.pattern()).stop(from_position);
        let to_stop = data.pattern(to.trip.pattern()).stop(to_position);
        TripToTripTransfer {
            from: TripStopTime::arrival(from.trip, from_position, from_stop),
            to: TripStopTime::departure(to.trip, to_position, to_stop),
            transfer: None,
            constraint,
        }
    }

    fn path<'data>(data: &'data TransitData, legs: Vec<PathLeg<'data>>, costs: &TailCostParams) -> Path<'data> {
        let stop = |name: &str| data.stop_idx(name).unwrap();
        Path::new(
            AccessEgress::walking(stop("A"), 60, 120_00),
            legs,
            AccessEgress::walking(stop("D"), 60, 120_00),
            costs.slacks,
            costs.calculator,
            0,
        )
    }

    #[test]
    fn mutate_leaves_the_original_tail_unchanged() {
        let data = data();
        let calculator = CostCalculator::default();
        let slacks = SlackParams::default();
        let costs = TailCostParams {
            calculator: &calculator,
            slacks: &slacks,
            wait_time_calculator: None,
        };
        let t1 = transit(&data, "T1", 0, 1);
        let t2 = transit(&data, "T2", 0, 2);
        let original = path(&data, vec![PathLeg::Transit(t1), PathLeg::Transit(t2)], &costs);

        let tail = OptimizedPathTail::new(&original, &costs).unwrap().unwrap();
        let copy = tail.mutate();
        assert_eq!(copy.to_string(), tail.to_string());

        let mut extended = tail.mutate();
        let transfer = transfer_at(&data, &t1, 2, &t2, 1, TransferConstraint::Regular);
        extended
            .add_transit_and_transfer_leg(&t1, &transfer, &costs)
            .unwrap();
        assert_eq!(copy.to_string(), tail.to_string());
        assert_ne!(extended.to_string(), tail.to_string());
        assert_eq!(extended.legs().count(), 2);
        assert_eq!(extended.head().unwrap().alight_position, 2);
        assert_eq!(extended.transfer_priority_cost(), 30_00);
        assert_eq!(tail.transfer_priority_cost(), 0);
    }

    #[test]
    fn inserting_the_access_rebuilds_the_path() {
        let data = data();
        let calculator = CostCalculator::default();
        let slacks = SlackParams::default();
        let costs = TailCostParams {
            calculator: &calculator,
            slacks: &slacks,
            wait_time_calculator: None,
        };
        let t1 = transit(&data, "T1", 0, 1);
        let t2 = transit(&data, "T2", 0, 2);
        let original = path(&data, vec![PathLeg::Transit(t1), PathLeg::Transit(t2)], &costs);

        let mut tail = OptimizedPathTail::new(&original, &costs).unwrap().unwrap();
        let transfer = transfer_at(&data, &t1, 1, &t2, 0, TransferConstraint::Regular);
        tail.add_transit_and_transfer_leg(&t1, &transfer, &costs)
            .unwrap();
        let optimized = tail.insert_access(&original, &costs).unwrap();

        assert_eq!(optimized.path().to_string(), original.to_string());
        assert_eq!(optimized.generalized_cost(), original.cost());
    }

    #[test]
    fn stay_seated_transfer_has_the_best_priority() {
        let data = data();
        let calculator = CostCalculator::default();
        let slacks = SlackParams::default();
        let mut wait_time_calculator = TransferWaitTimeCostCalculator::new(1.0, 5.0);
        wait_time_calculator.set_min_safe_transfer_time(120);
        let costs = TailCostParams {
            calculator: &calculator,
            slacks: &slacks,
            wait_time_calculator: Some(&wait_time_calculator),
        };
        let t1 = transit(&data, "T1", 0, 1);
        let t2 = transit(&data, "T2", 0, 2);
        let original = path(&data, vec![PathLeg::Transit(t1), PathLeg::Transit(t2)], &costs);
        let tail = OptimizedPathTail::new(&original, &costs).unwrap().unwrap();

        let mut regular = tail.mutate();
        let transfer = transfer_at(&data, &t1, 1, &t2, 0, TransferConstraint::Regular);
        regular
            .add_transit_and_transfer_leg(&t1, &transfer, &costs)
            .unwrap();
        let mut stay_seated = tail.mutate();
        let transfer = transfer_at(&data, &t1, 1, &t2, 0, TransferConstraint::StaySeated);
        stay_seated
            .add_transit_and_transfer_leg(&t1, &transfer, &costs)
            .unwrap();

        assert_eq!(stay_seated.transfer_priority_cost(), 10_00);
        assert!(stay_seated.wait_time_optimized_cost() < regular.wait_time_optimized_cost());
        assert_eq!(
            stay_seated.wait_time_optimized_cost(),
            stay_seated.generalized_cost() - 10_000_000
        );
    }
}
