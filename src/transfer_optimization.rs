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

//! Post-search choice of the transfer points of each path.
//!
//! The search keeps the first transfer it finds between two trips. Once paths are known,
//! all the places where the same trips can be connected are listed, and the one
//! with the best priority (stay-seated, guaranteed, others), then the safest wait,
//! then the lowest generalized cost, is kept.

mod optimized_path;
mod optimizer;
mod path_tail;
mod transfer_generator;
mod wait_time_cost;

pub use optimized_path::{OptimizedPath, TransferCosts};
pub use optimizer::OptimizePathService;
pub use path_tail::{OptimizedPathTail, TailCostParams};
pub use transfer_generator::{TransferGenerator, TripStopTime, TripToTripTransfer};
pub use wait_time_cost::{bound, min_safe_transfer_time, TransferWaitTimeCostCalculator};
