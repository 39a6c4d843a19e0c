//! Gateway implementations

mod batch;
mod builder;

pub use batch::DrugGateway;
pub use builder::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENT_FETCHES, DEFAULT_THRESHOLD, Eir, EirBuilder,
};
