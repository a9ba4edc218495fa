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

mod utils;

use std::time::Duration;

use anyhow::Error;
use launch::raptor::constrained_transfer::TransferConstraint;
use launch::raptor::engine::{path_criteria, RangeRaptorWorker, StdRoutingStrategy};
use launch::raptor::pareto_front::ParetoFront;
use launch::raptor::request::Deadline;
use launch::raptor::transit_data::builder::{trip_pos, AsDate, TransitDataBuilder};
use launch::raptor::{self, CostCalculator, Path, RaptorError, SearchRequest, TransitData, TransitDataProvider};
use launch::solver::Solver;
use rstest::rstest;
use utils::{build_and_solve, criteria, make_request_input, Config};

// L1 every 10 minutes from A to B
// L2 once from B to C
// L3 once, slowly, from A to C
fn data() -> TransitData {
    TransitDataBuilder::default()
        .route("L1", |r| {
            let mut r = r;
            for i in 0..12 {
                let departure: i32 = 8 * 3600 + i * 600;
                r = r.trip(&format!("L1-{}", i), |t| {
                    t.st("A", departure).st("B", departure + 600);
                });
            }
        })
        .route("L2", |r| {
            r.trip("L2-0", |t| {
                t.st("B", "09:30").st("C", "09:45");
            });
        })
        .route("L3", |r| {
            r.trip("L3-0", |t| {
                t.st("A", "08:30").st("C", "10:30");
            });
        })
        .build()
}

#[test]
fn test_pareto_front_on_transfers() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let mut config = Config::new("20200101T080000", "A", "C");
    config.request_params.search_window = "01:00:00".parse()?;
    let journeys = build_and_solve(&data(), &config)?;

    let date = "2020-01-01".as_date();
    assert_eq!(
        criteria(&journeys)
            .into_iter()
            .map(|(arrival, nb_of_transfers, _)| (arrival, nb_of_transfers))
            .collect::<Vec<_>>(),
        vec![(date.and_hms(9, 45, 0), 1), (date.and_hms(10, 30, 0), 0)]
    );
    // the latest departure of L1 within the window is used
    let fastest = journeys
        .iter()
        .find(|journey| journey.nb_of_transfers == 1)
        .unwrap();
    assert_eq!(fastest.departure_datetime, date.and_hms(9, 0, 0));

    Ok(())
}

#[test]
fn test_parallel_chunks_give_the_same_journeys() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = data();
    let mut config = Config::new("20200101T080000", "A", "C");
    config.request_params.search_window = "01:00:00".parse()?;
    let sequential = build_and_solve(&data, &config)?;

    config.request_params.parallel_chunks = 4;
    let parallel = build_and_solve(&data, &config)?;

    assert!(!sequential.is_empty());
    assert_eq!(criteria(&sequential), criteria(&parallel));
    Ok(())
}

#[test]
fn test_heuristics_are_lower_bounds() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = data();
    let mut config = Config::new("20200101T080000", "A", "C");
    config.request_params.search_window = "01:00:00".parse()?;
    let solver = Solver::new(&data, config.request_params.clone());
    let request = solver.make_request(&make_request_input(&config))?;

    let heuristics = raptor::heuristics(&data, &request);
    let origin = data.stop_idx("A").unwrap();
    let at_origin = heuristics.at(origin).unwrap();
    assert_eq!(at_origin.number_of_transfers, 1);

    let result = solver.solve_request_detailed(&make_request_input(&config))?;
    assert!(result.heuristic_summary.destination_reachable);
    assert_eq!(result.heuristic_summary.best_number_of_transfers, 0);
    for optimized in result.paths.iter() {
        let path = optimized.path();
        assert!(at_origin.duration <= path.duration());
        assert!(result.heuristic_summary.best_overall_duration <= path.duration());
    }
    Ok(())
}

#[test]
fn test_timeout() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = data();
    let config = Config::new("20200101T080000", "A", "C");
    let solver = Solver::new(&data, config.request_params.clone());
    let mut request = solver.make_request(&make_request_input(&config))?;
    request.timeout = Some(Duration::from_nanos(1));

    match raptor::search(&data, &request) {
        Err(RaptorError::Timeout { .. }) => (),
        Err(err) => panic!("unexpected error {}", err),
        Ok(_) => panic!("the search should have timed out"),
    }
    Ok(())
}

// S1 then S2 without leaving the vehicle at B,
// G1 then G2 with a guaranteed transfer at D,
// X directly from A to C on a route with a higher reluctance
fn constrained_data() -> TransitData {
    TransitDataBuilder::default()
        .route("S1", |r| {
            r.trip("S1-0", |t| {
                t.st("A", "09:00").st("B", "09:10");
            });
        })
        .route("S2", |r| {
            r.trip("S2-0", |t| {
                t.st("B", "09:10").st("C", "09:40");
            });
        })
        .route("G1", |r| {
            r.trip("G1-0", |t| {
                t.st("A", "09:05").st("D", "09:15");
            });
        })
        .route("G2", |r| {
            r.trip("G2-0", |t| {
                t.st("D", "09:15").st("C", "09:40");
            });
        })
        .route("X", |r| {
            r.transit_reluctance_index(1).trip("X-0", |t| {
                t.st("A", "09:10").st("C", "09:40");
            });
        })
        .constrained_transfer(trip_pos("S1-0", 1), trip_pos("S2-0", 0), TransferConstraint::StaySeated)
        .constrained_transfer(trip_pos("G1-0", 1), trip_pos("G2-0", 0), TransferConstraint::Guaranteed)
        .build()
}

fn paths_criteria(paths: &[Path], request: &SearchRequest) -> Vec<(i32, u8, i32)> {
    let mut result: Vec<_> = paths
        .iter()
        .map(|path| {
            let criteria = path_criteria(path, request.direction);
            (criteria.time, criteria.nb_of_transfers, criteria.cost)
        })
        .collect();
    result.sort_unstable();
    result
}

// every arrival is kept, then filtered like the routing does
fn route_without_pruning<'data>(data: &'data TransitData, request: &SearchRequest) -> Result<Vec<Path<'data>>, Error> {
    let strategy = StdRoutingStrategy::new(
        data,
        request,
        CostCalculator::new(&request.cost_params),
        data.active_services(request.date),
        None,
    );
    let mut worker = RangeRaptorWorker::new(
        data,
        request.direction,
        request.max_number_of_rounds(),
        request.search_access(),
        strategy,
    );
    worker.route(&request.iteration_times(), &Deadline::new(None))?;
    let mut front = ParetoFront::new();
    for path in worker.into_strategy().into_paths() {
        let criteria = path_criteria(&path, request.direction);
        front.add(path, criteria, &request.direction);
    }
    Ok(front.into_elements().into_iter().map(|(path, _)| path).collect())
}

#[rstest]
#[case::departure(Config::new("20200101T085900", "A", "C"))]
#[case::arrival(Config::new("20200101T094500", "A", "C").arrival())]
fn test_heuristics_keep_paths_with_constrained_transfers(#[case] config: Config) -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = constrained_data();
    let solver = Solver::new(&data, config.request_params.clone());
    let mut request = solver.make_request(&make_request_input(&config))?;
    request.cost_params.transit_reluctance = vec![1.0, 2.0];

    let routed = raptor::route(&data, &request)?;
    let unpruned = route_without_pruning(&data, &request)?;

    assert!(!unpruned.is_empty());
    assert_eq!(paths_criteria(&routed.paths, &request), paths_criteria(&unpruned, &request));
    Ok(())
}
