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

#![allow(dead_code)]

use launch::config::RequestParams;
use launch::datetime::{parse_datetime, DateTimeRepresent};
use launch::raptor::response::Journey;
use launch::raptor::tracing::debug;
use launch::raptor::{NaiveDateTime, PositiveDuration, TransitData};
use launch::solver::{RequestInput, Solver};

pub struct Config {
    pub request_params: RequestParams,

    pub datetime: NaiveDateTime,

    pub datetime_represent: DateTimeRepresent,

    /// name of the start stop
    pub start: String,

    /// name of the end stop
    pub end: String,
}

impl Config {
    /// `datetime` is formatted as 20200101T085900
    pub fn new(datetime: &str, start: &str, end: &str) -> Self {
        Config {
            request_params: Default::default(),
            datetime: parse_datetime(datetime).unwrap(),
            datetime_represent: Default::default(),
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn arrival(mut self) -> Self {
        self.datetime_represent = DateTimeRepresent::Arrival;
        self
    }
}

pub fn make_request_input(config: &Config) -> RequestInput {
    RequestInput {
        datetime: config.datetime,
        datetime_represent: config.datetime_represent,
        departures_stop_point_and_fallback_duration: vec![(
            config.start.clone(),
            PositiveDuration::zero(),
        )],
        arrivals_stop_point_and_fallback_duration: vec![(
            config.end.clone(),
            PositiveDuration::zero(),
        )],
    }
}

pub fn build_and_solve(data: &TransitData, config: &Config) -> Result<Vec<Journey>, anyhow::Error> {
    let solver = Solver::new(data, config.request_params.clone());
    let journeys = solver.solve_request(&make_request_input(config))?;
    for journey in journeys.iter() {
        debug!("{}", journey.print()?);
    }
    Ok(journeys)
}

/// (arrival, nb of transfers, cost) of each journey, sorted
pub fn criteria(journeys: &[Journey]) -> Vec<(NaiveDateTime, usize, i32)> {
    let mut criteria: Vec<_> = journeys
        .iter()
        .map(|journey| {
            (
                journey.arrival_datetime,
                journey.nb_of_transfers,
                journey.generalized_cost,
            )
        })
        .collect();
    criteria.sort();
    criteria
}
