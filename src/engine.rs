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

pub mod heuristic;
pub mod state;
pub mod strategy;
pub mod worker;

use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Instant;

use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use tracing::{debug, info};

pub use heuristic::{HeuristicAtStop, HeuristicRoutingStrategy, HeuristicSummary, Heuristics};
pub use state::{DestinationCriteria, StdRoutingStrategy};
pub use strategy::RoutingStrategy;
pub use worker::RangeRaptorWorker;

use crate::cost::CostCalculator;
use crate::error::RaptorError;
use crate::pareto_front::ParetoFront;
use crate::path::Path;
use crate::request::{Deadline, SearchRequest};
use crate::search_direction::SearchDirection;
use crate::time::Time;
use crate::transfer_optimization::{OptimizePathService, OptimizedPath};
use crate::transit_data::TransitDataProvider;

/// Paths found by the Range-Raptor search, before transfer optimization.
#[derive(Debug, Clone)]
pub struct RoutingResult<'data> {
    pub paths: Vec<Path<'data>>,
    pub heuristic_summary: HeuristicSummary,
    pub nb_of_iterations: usize,
    pub nb_of_rounds: u8,
}

/// Paths of a search, after transfer optimization.
#[derive(Debug, Clone)]
pub struct SearchResult<'data> {
    pub paths: Vec<OptimizedPath<'data>>,
    pub heuristic_summary: HeuristicSummary,
    pub nb_of_iterations: usize,
    pub nb_of_rounds: u8,
}

/// Run the Range-Raptor search of `request`, then optimize the transfers of the paths found.
///
/// `request.timeout` covers both phases.
pub fn search<'data, Data>(
    data: &'data Data,
    request: &SearchRequest,
) -> Result<SearchResult<'data>, RaptorError>
where
    Data: TransitDataProvider,
{
    let deadline = Deadline::new(request.timeout);
    let routing = route_with_deadline(data, request, &deadline)?;

    let optimization_timer = Instant::now();
    let service = OptimizePathService::new(data, request);
    let paths = service.optimize(&routing.paths, &deadline)?;
    debug!(
        "Transfers optimized in {} ms",
        optimization_timer.elapsed().as_millis()
    );
    info!(
        "Search done in {} ms : {} paths found",
        deadline.elapsed().as_millis(),
        paths.len()
    );

    Ok(SearchResult {
        paths,
        heuristic_summary: routing.heuristic_summary,
        nb_of_iterations: routing.nb_of_iterations,
        nb_of_rounds: routing.nb_of_rounds,
    })
}

/// Lower bounds from every stop toward the destination of `request`
/// (toward the origin for an arrive-by request).
///
/// The heuristic search runs in the direction opposite to the request,
/// starting from the legs where the request ends.
pub fn heuristics<Data>(data: &Data, request: &SearchRequest) -> Heuristics
where
    Data: TransitDataProvider,
{
    let calculator = CostCalculator::new(&request.cost_params);
    compute_heuristics(data, request, &calculator)
}

fn compute_heuristics<Data>(data: &Data, request: &SearchRequest, calculator: &CostCalculator) -> Heuristics
where
    Data: TransitDataProvider,
{
    let direction = request.direction.opposite();
    let constrained_transfers = if request.enable_transfer_constraints {
        data.constrained_transfers()
    } else {
        None
    };
    let strategy = HeuristicRoutingStrategy::new(data.nb_of_stops(), direction, calculator.clone())
        .with_constrained_transfers(constrained_transfers);
    let mut worker = RangeRaptorWorker::new(
        data,
        direction,
        request.max_number_of_rounds(),
        request.search_egress(),
        strategy,
    );
    // a single iteration cannot time out
    let _ = worker.route(&[0], &Deadline::new(None));
    worker.into_strategy().into_heuristics()
}

/// Run the Range-Raptor search of `request`.
pub fn route<'data, Data>(
    data: &'data Data,
    request: &SearchRequest,
) -> Result<RoutingResult<'data>, RaptorError>
where
    Data: TransitDataProvider,
{
    let deadline = Deadline::new(request.timeout);
    route_with_deadline(data, request, &deadline)
}

pub(crate) fn route_with_deadline<'data, Data>(
    data: &'data Data,
    request: &SearchRequest,
    deadline: &Deadline,
) -> Result<RoutingResult<'data>, RaptorError>
where
    Data: TransitDataProvider,
{
    let calculator = CostCalculator::new(&request.cost_params);

    deadline.check("heuristics")?;
    let heuristics_timer = Instant::now();
    let heuristics = compute_heuristics(data, request, &calculator);
    let heuristic_summary = heuristics.summary(request.search_access());
    debug!(
        "Heuristics computed in {} ms, {} stops reached",
        heuristics_timer.elapsed().as_millis(),
        heuristics.nb_of_reached_stops()
    );

    let iteration_times = request.iteration_times();
    if !heuristic_summary.destination_reachable {
        info!("The destination cannot be reached from the origin.");
        return Ok(RoutingResult {
            paths: Vec::new(),
            heuristic_summary,
            nb_of_iterations: 0,
            nb_of_rounds: 0,
        });
    }

    let heuristics = Arc::new(heuristics);
    let services = data.active_services(request.date);
    let nb_of_chunks = request.parallel_chunks.max(1).min(iteration_times.len().max(1));
    let chunk_size = (iteration_times.len() + nb_of_chunks - 1) / nb_of_chunks;

    let routing_timer = Instant::now();
    let run_chunk = |iteration_times: &[Time]| {
        route_chunk(
            data,
            request,
            &calculator,
            &services,
            &heuristics,
            iteration_times,
            deadline,
        )
    };
    let chunk_results: Vec<(Vec<Path<'data>>, u8)> = if nb_of_chunks > 1 {
        iteration_times
            .par_chunks(chunk_size.max(1))
            .map(run_chunk)
            .collect::<Result<_, _>>()?
    } else {
        vec![run_chunk(&iteration_times)?]
    };

    // chunks come in iteration order, so that ties keep the path found first
    let direction = request.direction;
    let mut front = ParetoFront::new();
    let mut nb_of_rounds = 0;
    for (paths, chunk_nb_of_rounds) in chunk_results {
        nb_of_rounds = nb_of_rounds.max(chunk_nb_of_rounds);
        for path in paths {
            let criteria = path_criteria(&path, direction);
            front.add(path, criteria, &direction);
        }
    }
    let paths: Vec<Path<'data>> = front.into_elements().into_iter().map(|(path, _)| path).collect();

    debug!(
        "Journeys computed in {} ms with {} rounds, in {} chunks",
        routing_timer.elapsed().as_millis(),
        nb_of_rounds,
        nb_of_chunks
    );
    debug!("Nb of journeys found : {}", paths.len());

    Ok(RoutingResult {
        paths,
        heuristic_summary,
        nb_of_iterations: iteration_times.len(),
        nb_of_rounds,
    })
}

#[allow(clippy::too_many_arguments)]
fn route_chunk<'data, Data>(
    data: &'data Data,
    request: &SearchRequest,
    calculator: &CostCalculator,
    services: &FixedBitSet,
    heuristics: &Arc<Heuristics>,
    iteration_times: &[Time],
    deadline: &Deadline,
) -> Result<(Vec<Path<'data>>, u8), RaptorError>
where
    Data: TransitDataProvider,
{
    let strategy = StdRoutingStrategy::new(
        data,
        request,
        calculator.clone(),
        services.clone(),
        Some(Arc::clone(heuristics)),
    );
    let mut worker = RangeRaptorWorker::new(
        data,
        request.direction,
        request.max_number_of_rounds(),
        request.search_access(),
        strategy,
    );
    worker.route(iteration_times, deadline)?;
    let nb_of_rounds = worker.nb_of_rounds();
    let strategy = worker.into_strategy();
    debug!(
        "{} iterations done with {} arrivals, {} at destination",
        iteration_times.len(),
        strategy.nb_of_arrivals(),
        strategy.nb_of_destination_arrivals()
    );
    Ok((strategy.into_paths(), nb_of_rounds))
}

/// Criteria of `path` in the sense of `direction`.
pub fn path_criteria(path: &Path, direction: SearchDirection) -> DestinationCriteria {
    let time = match direction {
        SearchDirection::Forward => path.end_time(),
        SearchDirection::Reverse => path.start_time(),
    };
    DestinationCriteria {
        time,
        nb_of_transfers: u8::try_from(path.nb_of_transfers()).unwrap_or(u8::MAX),
        cost: path.cost(),
    }
}
