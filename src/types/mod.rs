//! Public types for the Eir API.

mod name;
mod record;

pub use name::CanonicalName;
pub use record::DrugRecord;
