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

use fixedbitset::FixedBitSet;

use crate::request::AccessEgress;
use crate::time::Time;
use crate::transit_data::{Pattern, StopIdx, Timetable, Transfer};

/// What the Range-Raptor worker delegates : the state of the search,
/// and how trips are boarded and alighted.
///
/// The worker only knows about rounds, patterns and positions.
/// A strategy may keep a full multi-criteria state (see `StdRoutingStrategy`)
/// or only lower bounds (see `HeuristicRoutingStrategy`).
pub trait RoutingStrategy<'data> {
    /// A handle on an arrival at a stop from which a trip can be boarded.
    type Arrival: Copy;

    /// Called before the access legs of a Range-Raptor iteration are set.
    fn setup_iteration(&mut self, iteration_time: Time);

    /// Arrival at `access.stop` in round 0, by walking from the origin.
    fn set_access_to_stop(&mut self, access: &AccessEgress, iteration_time: Time);

    /// Arrival at `access.stop` in round 1, as if alighting from a trip.
    fn set_on_board_access_to_stop(&mut self, access: &AccessEgress, iteration_time: Time);

    /// Swap the stops touched in the current round with the ones of the previous round.
    /// Returns `false` when no stop was touched during the previous round.
    fn prepare_for_next_round(&mut self, round: u8) -> bool;

    fn stops_touched_previous_round(&self) -> &FixedBitSet;

    fn stops_touched_by_transit_current_round(&self) -> &FixedBitSet;

    /// Called before scanning the positions of `pattern`.
    fn prepare_for_transit_with(&mut self, pattern: &'data Pattern, timetable: &'data Timetable);

    /// Alight from all trips boarded on the current pattern.
    fn alight(&mut self, stop: StopIdx, position: usize);

    /// Arrivals of the previous round at `stop`, pushed into `arrivals`.
    fn boardings_at(&self, stop: StopIdx, arrivals: &mut Vec<Self::Arrival>);

    /// Returns `true` when the boarding was handled by a constrained transfer,
    /// including when such a transfer forbids it.
    fn board_with_constrained_transfer(
        &mut self,
        arrival: Self::Arrival,
        stop: StopIdx,
        position: usize,
    ) -> bool;

    fn board_with_regular_transfer(&mut self, arrival: Self::Arrival, stop: StopIdx, position: usize);

    /// Walk from the arrivals by transit at `from_stop`.
    fn transfer_to_stops(&mut self, from_stop: StopIdx, transfers: &'data [Transfer]);

    fn round_complete(&mut self);

    fn iteration_complete(&mut self);
}
