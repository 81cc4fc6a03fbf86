//! To-do list: user-entered and machine-extracted action items.

pub mod model;
pub mod routes;

pub use model::{ActionItem, ActionSource, Category};
