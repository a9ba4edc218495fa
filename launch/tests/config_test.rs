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

use std::io::Write;

use anyhow::Error;
use launch::config::{self, RequestParams};
use launch::raptor::search_direction::SearchDirection;
use launch::raptor::transit_data::builder::AsDate;
use launch::raptor::{PositiveDuration, SearchRequest};
use structopt::StructOpt;

#[test]
fn default_request_params_are_consistent() {
    let from_args = RequestParams::from_iter(&["test"]);
    assert_eq!(from_args, RequestParams::default());

    let from_json: RequestParams = serde_json::from_str("{}").unwrap();
    assert_eq!(from_json, RequestParams::default());
}

#[test]
fn request_params_from_args() {
    let params = RequestParams::from_iter(&[
        "test",
        "--max_nb_of_transfers",
        "3",
        "--search_window",
        "02:00:00",
        "--optimize_transfers",
        "false",
    ]);
    assert_eq!(params.max_nb_of_transfers, 3);
    assert_eq!(params.search_window, PositiveDuration::from_hms(2, 0, 0));
    assert!(!params.optimize_transfers);
}

#[test]
fn request_params_from_json() -> Result<(), Error> {
    let json = r#"{
        "max_nb_of_transfers": 2,
        "transfer_slack": "00:02:00",
        "wait_reluctance": 1.5,
        "timeout": "00:00:00"
    }"#;
    let params: RequestParams = serde_json::from_str(json)?;
    assert_eq!(params.max_nb_of_transfers, 2);
    assert_eq!(params.transfer_slack, PositiveDuration::from_seconds(120));

    let mut request = SearchRequest::new(
        "2020-01-01".as_date(),
        SearchDirection::Forward,
        0,
        Vec::new(),
        Vec::new(),
    );
    params.apply_to(&mut request);
    assert_eq!(request.max_number_of_transfers, 2);
    assert_eq!(request.slacks.transfer_slack, 120);
    assert_eq!(request.cost_params.wait_reluctance, 1.5);
    assert_eq!(request.cost_params.board_cost, 600);
    assert_eq!(request.search_window, 30 * 60);
    // a null timeout disables it
    assert_eq!(request.timeout, None);

    let unknown_field = r#"{ "max_nb_of_legs": 2 }"#;
    assert!(serde_json::from_str::<RequestParams>(unknown_field).is_err());
    Ok(())
}

#[test]
fn request_params_from_file() -> Result<(), Error> {
    let path = std::env::temp_dir().join("raptor_request_params_test.json");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, r#"{{ "parallel_chunks": 4 }}"#)?;
    drop(file);

    let params = config::read_request_params(&path)?;
    assert_eq!(params.parallel_chunks, 4);
    assert_eq!(params.max_nb_of_transfers, 10);
    std::fs::remove_file(&path)?;

    let missing = std::env::temp_dir().join("raptor_missing_request_params.json");
    assert!(config::read_request_params(&missing).is_err());
    Ok(())
}

#[test]
fn request_params_from_env() {
    std::env::set_var(config::MAX_NB_OF_TRANSFERS_ENV_VAR, "4");
    std::env::set_var(config::PARALLEL_CHUNKS_ENV_VAR, "not a number");
    let params = config::apply_env_overrides(RequestParams::default());
    std::env::remove_var(config::MAX_NB_OF_TRANSFERS_ENV_VAR);
    std::env::remove_var(config::PARALLEL_CHUNKS_ENV_VAR);

    assert_eq!(params.max_nb_of_transfers, 4);
    // badly formed values are ignored
    assert_eq!(params.parallel_chunks, 1);
}
