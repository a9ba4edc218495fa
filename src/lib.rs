extern crate static_assertions;

pub mod constrained_transfer;
pub mod cost;
pub mod engine;
pub mod error;
pub mod path;
pub mod pareto_front;
pub mod request;
pub mod response;
pub mod search_direction;
pub mod time;
pub mod transfer_optimization;
pub mod transit_data;

pub use chrono;
pub use chrono::{NaiveDate, NaiveDateTime};
pub use tracing;

pub use cost::{Cost, CostCalculator, CostParams};
pub use engine::{heuristics, route, search, RoutingResult, SearchResult};
pub use error::RaptorError;
pub use path::Path;
pub use request::{AccessEgress, SearchRequest, SlackParams, TransferOptimizationParams};
pub use search_direction::SearchDirection;
pub use time::{PositiveDuration, Time};
pub use transfer_optimization::OptimizedPath;
pub use transit_data::{TransitData, TransitDataProvider};
