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

pub mod request_params;

use std::fmt::{Debug, Display};
use std::path::Path;

use anyhow::Context;
use raptor::tracing::warn;

pub use request_params::RequestParams;

// - var not set -> use default value
// - var set but non-unicode -> warn and use default value
// - var set but not parsable -> warn and use default value
pub fn parse_env_var<T, Parser, ParseErr>(var_name: &str, default_value: T, parser: Parser) -> T
where
    Parser: Fn(&str) -> Result<T, ParseErr>,
    ParseErr: Display,
    T: Debug,
{
    match std::env::var(var_name) {
        Ok(s) => match parser(&s) {
            Ok(val) => val,
            Err(err) => {
                warn!(
                    "Could not parse env var {} : {}. I'll use the default value '{:?}' instead",
                    var_name, err, default_value
                );
                default_value
            }
        },
        Err(std::env::VarError::NotPresent) => default_value,
        Err(std::env::VarError::NotUnicode(err)) => {
            warn!(
                "Badly formed env var {} : {:?}. I'll use the default value {:?} instead",
                var_name, err, default_value
            );
            default_value
        }
    }
}

// for infaillible parser
pub fn read_env_var<T, Parser>(var_name: &str, default_value: T, parser: Parser) -> T
where
    Parser: Fn(&str) -> T,
    T: Debug,
{
    parse_env_var(var_name, default_value, |s| -> Result<T, &'static str> {
        Ok(parser(s))
    })
}

/// Read request parameters from a json file.
/// Missing fields take their default value.
pub fn read_request_params(path: &Path) -> Result<RequestParams, anyhow::Error> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Error opening request params file {:?}", path))?;
    let reader = std::io::BufReader::new(file);
    let params = serde_json::from_reader(reader)
        .with_context(|| format!("Could not parse request params file {:?}", path))?;
    Ok(params)
}

pub const MAX_NB_OF_TRANSFERS_ENV_VAR: &str = "RAPTOR_MAX_NB_OF_TRANSFERS";
pub const TIMEOUT_ENV_VAR: &str = "RAPTOR_TIMEOUT";
pub const PARALLEL_CHUNKS_ENV_VAR: &str = "RAPTOR_PARALLEL_CHUNKS";
pub const OPTIMIZE_TRANSFERS_ENV_VAR: &str = "RAPTOR_OPTIMIZE_TRANSFERS";

/// `params`, with the values overridden by environment variables
pub fn apply_env_overrides(params: RequestParams) -> RequestParams {
    RequestParams {
        max_nb_of_transfers: parse_env_var(
            MAX_NB_OF_TRANSFERS_ENV_VAR,
            params.max_nb_of_transfers,
            str::parse,
        ),
        timeout: parse_env_var(TIMEOUT_ENV_VAR, params.timeout, str::parse),
        parallel_chunks: parse_env_var(PARALLEL_CHUNKS_ENV_VAR, params.parallel_chunks, str::parse),
        optimize_transfers: parse_env_var(
            OPTIMIZE_TRANSFERS_ENV_VAR,
            params.optimize_transfers,
            str::parse,
        ),
        ..params
    }
}
