//! Drug-information source implementations.
//!
//! [`DrugSource`] is the capability boundary between the gateway and the
//! outside world: the gateway fetches through a trait object, so tests
//! substitute doubles and production injects [`OpenFdaClient`].

pub mod openfda;
pub mod traits;

pub use openfda::OpenFdaClient;
pub use traits::DrugSource;
