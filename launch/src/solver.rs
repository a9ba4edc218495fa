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

use raptor::request::walking_legs;
use raptor::response::Journey;
use raptor::tracing::{debug, info, trace};
use raptor::{
    CostCalculator, NaiveDateTime, PositiveDuration, SearchRequest, SearchResult,
    TransitDataProvider,
};

use crate::config::RequestParams;
use crate::datetime::{split_datetime, DateTimeRepresent};

/// A request expressed with stop names and calendar datetimes.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub datetime: NaiveDateTime,
    pub datetime_represent: DateTimeRepresent,
    pub departures_stop_point_and_fallback_duration: Vec<(String, PositiveDuration)>,
    pub arrivals_stop_point_and_fallback_duration: Vec<(String, PositiveDuration)>,
}

#[derive(Debug)]
pub enum BadRequest {
    NoValidDepartureStop,
    NoValidArrivalStop,
}

impl std::error::Error for BadRequest {}

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadRequest::NoValidDepartureStop => {
                write!(f, "No valid departure stop among the provided ones.")
            }
            BadRequest::NoValidArrivalStop => {
                write!(f, "No valid arrival stop among the provided ones.")
            }
        }
    }
}

pub struct Solver<'data, Data> {
    data: &'data Data,
    params: RequestParams,
}

impl<'data, Data> Solver<'data, Data>
where
    Data: TransitDataProvider,
{
    pub fn new(data: &'data Data, params: RequestParams) -> Self {
        Self { data, params }
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Resolve the stop names of `request_input`, unknown stops are ignored.
    pub fn make_request(&self, request_input: &RequestInput) -> Result<SearchRequest, BadRequest> {
        let calculator = CostCalculator::new(&self.params.cost_params());
        let legs = |stops: &[(String, PositiveDuration)]| {
            let stops: Vec<(&str, raptor::Time)> = stops
                .iter()
                .map(|(name, duration)| (name.as_str(), duration.as_time()))
                .collect();
            walking_legs(self.data, &stops, |duration| calculator.walk_cost(duration))
        };
        let access = legs(&request_input.departures_stop_point_and_fallback_duration);
        if access.is_empty() {
            return Err(BadRequest::NoValidDepartureStop);
        }
        let egress = legs(&request_input.arrivals_stop_point_and_fallback_duration);
        if egress.is_empty() {
            return Err(BadRequest::NoValidArrivalStop);
        }

        let (date, time) = split_datetime(&request_input.datetime);
        let mut request = SearchRequest::new(
            date,
            request_input.datetime_represent.direction(),
            time,
            access,
            egress,
        );
        self.params.apply_to(&mut request);
        Ok(request)
    }

    pub fn solve_request_detailed(
        &self,
        request_input: &RequestInput,
    ) -> Result<SearchResult<'data>, anyhow::Error> {
        let request = self.make_request(request_input)?;
        debug!(
            "Start computing journeys with {} {}",
            request_input.datetime_represent, request_input.datetime
        );
        let timer = Instant::now();
        let result = raptor::search(self.data, &request)?;
        info!(
            "Journeys computed in {} ms with {} rounds",
            timer.elapsed().as_millis(),
            result.nb_of_rounds
        );
        info!("Nb of journeys found : {}", result.paths.len());
        Ok(result)
    }

    pub fn solve_request(&self, request_input: &RequestInput) -> Result<Vec<Journey>, anyhow::Error> {
        let date = request_input.datetime.date();
        let result = self.solve_request_detailed(request_input)?;
        let journeys: Vec<Journey> = result
            .paths
            .iter()
            .map(|optimized| Journey::from_path(optimized.path(), date, self.data))
            .collect();
        for journey in &journeys {
            trace!("{}", journey.print()?);
        }
        Ok(journeys)
    }
}
