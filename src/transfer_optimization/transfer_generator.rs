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

use crate::constrained_transfer::{ConstrainedTransferIndex, TransferConstraint};
use crate::path::TransitLeg;
use crate::request::{SearchRequest, SlackParams};
use crate::time::{format_duration_short, format_time_short, Time};
use crate::transit_data::{StopIdx, Transfer, TransitDataProvider, TripSchedule};

/// A trip at a position of its pattern
#[derive(Debug, Clone, Copy)]
pub struct TripStopTime<'data> {
    pub trip: &'data TripSchedule,
    pub position: usize,
    pub stop: StopIdx,
    /// arrival time when alighting, departure time when boarding
    pub time: Time,
}

impl<'data> TripStopTime<'data> {
    pub fn arrival(trip: &'data TripSchedule, position: usize, stop: StopIdx) -> Self {
        Self {
            trip,
            position,
            stop,
            time: trip.arrival(position),
        }
    }

    pub fn departure(trip: &'data TripSchedule, position: usize, stop: StopIdx) -> Self {
        Self {
            trip,
            position,
            stop,
            time: trip.departure(position),
        }
    }

    fn describe<Data: TransitDataProvider>(&self, data: &Data) -> String {
        format!(
            "{} {} {}",
            self.trip.id(),
            data.stop_name(self.stop),
            format_time_short(self.time)
        )
    }
}

impl<'data> Display for TripStopTime<'data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}@{} {}",
            self.trip.id(),
            self.stop,
            self.position,
            format_time_short(self.time)
        )
    }
}

/// A feasible way to go from one trip to the next
#[derive(Debug, Clone, Copy)]
pub struct TripToTripTransfer<'data> {
    pub from: TripStopTime<'data>,
    pub to: TripStopTime<'data>,
    /// `None` when both trips stop at the same stop
    pub transfer: Option<Transfer>,
    pub constraint: TransferConstraint,
}

impl<'data> TripToTripTransfer<'data> {
    pub fn walk_duration(&self) -> Time {
        self.transfer.map_or(0, |transfer| transfer.duration)
    }

    pub fn is_same_stop(&self) -> bool {
        self.transfer.is_none()
    }

    /// Time between the arrival of the first trip and the departure of the second, walk excluded
    pub fn wait_time(&self) -> Time {
        self.to.time - self.from.time - self.walk_duration()
    }

    /// Human readable description, with stop names
    pub fn describe<Data: TransitDataProvider>(&self, data: &Data) -> String {
        let walk = match self.transfer {
            Some(transfer) => format!(" ~ Walk {}", format_duration_short(transfer.duration)),
            None => String::new(),
        };
        let constraint = if self.constraint.is_regular() {
            String::new()
        } else {
            format!(" ({})", self.constraint)
        };
        format!(
            "{}{} ~ {}{}",
            self.from.describe(data),
            walk,
            self.to.describe(data),
            constraint
        )
    }
}

impl<'data> Display for TripToTripTransfer<'data> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.from)?;
        if let Some(transfer) = self.transfer {
            write!(f, " ~ Walk {}", format_duration_short(transfer.duration))?;
        }
        write!(f, " ~ {}", self.to)?;
        if !self.constraint.is_regular() {
            write!(f, " ({})", self.constraint)?;
        }
        Ok(())
    }
}

/// Lists, for each pair of consecutive rides of a path, all the transfers
/// that could replace the one found by the search.
pub struct TransferGenerator<'data, Data> {
    data: &'data Data,
    slacks: SlackParams,
    constraints: Option<&'data ConstrainedTransferIndex>,
    minimum_transfer_time_is_definitive: bool,
}

impl<'data, Data> TransferGenerator<'data, Data>
where
    Data: TransitDataProvider,
{
    pub fn new(data: &'data Data, request: &SearchRequest) -> Self {
        let constraints = if request.enable_transfer_constraints {
            data.constrained_transfers()
        } else {
            None
        };
        Self {
            data,
            slacks: request.slacks,
            constraints,
            minimum_transfer_time_is_definitive: request.minimum_transfer_time_is_definitive,
        }
    }

    /// `transit_legs` in real-time order.
    /// The n-th element of the result holds the transfers from the n-th leg to the next one.
    ///
    /// A ride may be boarded as early as the earliest transfer toward it allows,
    /// so the transfers considered after it start from there.
    pub fn find_all_possible_transfers(
        &self,
        transit_legs: &[TransitLeg<'data>],
    ) -> Vec<Vec<TripToTripTransfer<'data>>> {
        let mut result = Vec::with_capacity(transit_legs.len().saturating_sub(1));
        let mut earliest_board_position = match transit_legs.first() {
            Some(first) => first.board_position,
            None => return result,
        };
        for legs in transit_legs.windows(2) {
            let (from_leg, to_leg) = (&legs[0], &legs[1]);
            let transfers = self.find_transfers(from_leg, earliest_board_position, to_leg);
            earliest_board_position = transfers
                .iter()
                .map(|transfer| transfer.to.position)
                .min()
                .unwrap_or(to_leg.board_position);
            result.push(transfers);
        }
        result
    }

    fn find_transfers(
        &self,
        from_leg: &TransitLeg<'data>,
        earliest_board_position: usize,
        to_leg: &TransitLeg<'data>,
    ) -> Vec<TripToTripTransfer<'data>> {
        let data = self.data;
        let from_pattern = data.pattern(from_leg.trip.pattern());
        let mut transfers = Vec::new();

        for from_position in (earliest_board_position + 1)..from_pattern.nb_of_positions() {
            if !from_pattern.can_debark(from_position) {
                continue;
            }
            let from_stop = from_pattern.stop(from_position);
            let from = TripStopTime::arrival(from_leg.trip, from_position, from_stop);

            self.add_transfers_to_stop(&from, from_stop, None, to_leg, &mut transfers);

            for transfer in data.transfers_from(from_stop) {
                if transfer.to_stop != from_stop {
                    self.add_transfers_to_stop(&from, transfer.to_stop, Some(*transfer), to_leg, &mut transfers);
                }
            }
        }
        transfers
    }

    // boarding positions of `to_leg` at `to_stop`, before it is left
    fn add_transfers_to_stop(
        &self,
        from: &TripStopTime<'data>,
        to_stop: StopIdx,
        transfer: Option<Transfer>,
        to_leg: &TransitLeg<'data>,
        transfers: &mut Vec<TripToTripTransfer<'data>>,
    ) {
        let to_pattern = self.data.pattern(to_leg.trip.pattern());
        for to_position in 0..to_leg.alight_position {
            if to_pattern.stop(to_position) != to_stop || !to_pattern.can_board(to_position) {
                continue;
            }
            let to = TripStopTime::departure(to_leg.trip, to_position, to_stop);
            let constraint = self.constraint(from, &to);
            let walk_duration = transfer.map_or(0, |transfer| transfer.duration);
            if self.is_feasible(from, &to, walk_duration, constraint) {
                transfers.push(TripToTripTransfer {
                    from: *from,
                    to,
                    transfer,
                    constraint,
                });
            }
        }
    }

    fn constraint(&self, from: &TripStopTime, to: &TripStopTime) -> TransferConstraint {
        self.constraints
            .and_then(|index| index.find_constraint(from.trip, from.position, from.stop, to.trip, to.position))
            .unwrap_or_default()
    }

    fn is_feasible(
        &self,
        from: &TripStopTime,
        to: &TripStopTime,
        walk_duration: Time,
        constraint: TransferConstraint,
    ) -> bool {
        let slacks = &self.slacks;
        let regular_earliest =
            from.time + slacks.alight_slack + walk_duration + slacks.transfer_slack + slacks.board_slack;
        match constraint {
            TransferConstraint::NotAllowed => false,
            TransferConstraint::Guaranteed | TransferConstraint::StaySeated => {
                to.time >= from.time + walk_duration
            }
            TransferConstraint::MinTransferTime(min_time) => {
                let with_min_time = from.time + min_time;
                if self.minimum_transfer_time_is_definitive {
                    to.time >= with_min_time
                } else {
                    to.time >= with_min_time.max(regular_earliest)
                }
            }
            TransferConstraint::Regular => to.time >= regular_earliest,
        }
    }
}
