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

//! Transfers whose eligibility is overridden between specific stops, stations, routes or trips.
//!
//! A `ConstrainedTransfer` links a *from* `TransferPoint` to a *to* `TransferPoint`.
//! When several constrained transfers apply to the same boarding, the most specific one wins,
//! the specificity of a point being :
//!
//! | point                      | ranking |
//! |----------------------------|---------|
//! | stop                       | 0       |
//! | station                    | 1       |
//! | route + stop               | 2       |
//! | trip + stop position       | 3       |
//!
//! and the specificity of a transfer being `10 * ranking(from) + ranking(to)`.

mod index;
mod search;

pub use index::{ConstrainedTransferIndex, TransferForPattern, TransfersForPattern};
pub use search::{ConstrainedBoarding, ConstrainedBoardingSearch, ABORT_SEARCH_AFTER_N_VALID_NORMAL_TRIPS};

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use crate::cost::Cost;
use crate::error::RaptorError;
use crate::time::{format_duration_short, Time};
use crate::transit_data::{RouteIdx, StationIdx, StopIdx, TripIdx, TripSchedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferConstraint {
    Regular,
    Guaranteed,
    StaySeated,
    /// minimum connection time, in seconds
    MinTransferTime(Time),
    NotAllowed,
}

impl Default for TransferConstraint {
    fn default() -> Self {
        TransferConstraint::Regular
    }
}

// per transfer, lower is better
const STAY_SEATED_PRIORITY_COST: Cost = 10_00;
const GUARANTEED_PRIORITY_COST: Cost = 20_00;
const NONE_FACILITATED_PRIORITY_COST: Cost = 30_00;

impl TransferConstraint {
    pub fn is_regular(&self) -> bool {
        matches!(self, TransferConstraint::Regular)
    }

    pub fn is_not_allowed(&self) -> bool {
        matches!(self, TransferConstraint::NotAllowed)
    }

    pub fn is_stay_seated(&self) -> bool {
        matches!(self, TransferConstraint::StaySeated)
    }

    pub fn is_guaranteed(&self) -> bool {
        matches!(self, TransferConstraint::Guaranteed)
    }

    /// Guaranteed and stay-seated transfers ignore the boarding and alighting slacks
    pub fn is_facilitated(&self) -> bool {
        self.is_stay_seated() || self.is_guaranteed()
    }

    pub fn min_transfer_time(&self) -> Option<Time> {
        match self {
            TransferConstraint::MinTransferTime(duration) => Some(*duration),
            _ => None,
        }
    }

    /// Cost used to rank transfers when optimizing paths : facilitated transfers first.
    pub fn priority_cost(&self) -> Cost {
        match self {
            TransferConstraint::StaySeated => STAY_SEATED_PRIORITY_COST,
            TransferConstraint::Guaranteed => GUARANTEED_PRIORITY_COST,
            _ => NONE_FACILITATED_PRIORITY_COST,
        }
    }
}

impl Display for TransferConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferConstraint::Regular => write!(f, "regular"),
            TransferConstraint::Guaranteed => write!(f, "guaranteed"),
            TransferConstraint::StaySeated => write!(f, "stay-seated"),
            TransferConstraint::MinTransferTime(duration) => {
                write!(f, "min-time {}", format_duration_short(*duration))
            }
            TransferConstraint::NotAllowed => write!(f, "not-allowed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransferPoint {
    Stop(StopIdx),
    Station(StationIdx),
    RouteStop { route: RouteIdx, stop: StopIdx },
    Trip { trip: TripIdx, stop_position: usize },
    Composite(CompositeTransferPoint),
}

impl TransferPoint {
    pub fn specificity_ranking(&self) -> u8 {
        match self {
            TransferPoint::Stop(_) => 0,
            TransferPoint::Station(_) => 1,
            TransferPoint::RouteStop { .. } => 2,
            TransferPoint::Trip { .. } => 3,
            TransferPoint::Composite(composite) => composite
                .points
                .iter()
                .map(TransferPoint::specificity_ranking)
                .min()
                .unwrap_or(0),
        }
    }

    /// Does this point designate `trip` at `stop_position` ?
    /// `stop` is the stop at this position and `station` its station, if any.
    pub fn matches(
        &self,
        trip: &TripSchedule,
        stop_position: usize,
        stop: StopIdx,
        station: Option<StationIdx>,
    ) -> bool {
        match self {
            TransferPoint::Stop(point_stop) => *point_stop == stop,
            TransferPoint::Station(point_station) => station == Some(*point_station),
            TransferPoint::RouteStop {
                route,
                stop: point_stop,
            } => *route == trip.route() && *point_stop == stop,
            TransferPoint::Trip {
                trip: point_trip,
                stop_position: point_position,
            } => *point_trip == trip.idx() && *point_position == stop_position,
            TransferPoint::Composite(composite) => composite
                .points
                .iter()
                .any(|point| point.matches(trip, stop_position, stop, station)),
        }
    }

    /// The trip designated by this point, if it designates exactly one trip
    pub fn trip(&self) -> Option<TripIdx> {
        match self {
            TransferPoint::Trip { trip, .. } => Some(*trip),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, TransferPoint::Composite(_))
    }
}

/// "Any of these points".
///
/// Members are kept sorted and deduplicated, and a composite never contains another composite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeTransferPoint {
    points: Vec<TransferPoint>,
}

impl CompositeTransferPoint {
    pub fn new<Points>(points: Points) -> Result<Self, RaptorError>
    where
        Points: IntoIterator<Item = TransferPoint>,
    {
        let points: BTreeSet<TransferPoint> = points.into_iter().collect();
        if points.iter().any(TransferPoint::is_composite) {
            return Err(RaptorError::NestedCompositeTransferPoint);
        }
        Ok(Self {
            points: points.into_iter().collect(),
        })
    }

    pub fn points(&self) -> &[TransferPoint] {
        &self.points
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstrainedTransfer {
    pub from: TransferPoint,
    pub to: TransferPoint,
    pub constraint: TransferConstraint,
}

impl ConstrainedTransfer {
    pub fn new(from: TransferPoint, to: TransferPoint, constraint: TransferConstraint) -> Self {
        Self {
            from,
            to,
            constraint,
        }
    }

    pub fn specificity_ranking(&self) -> u8 {
        10 * self.from.specificity_ranking() + self.to.specificity_ranking()
    }
}
