pub mod model;
pub mod routes;

pub use model::{Frequency, Medicine, TimeOfDay};
