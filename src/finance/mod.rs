pub mod model;
pub mod routes;

pub use model::{Bill, BillCategory, BudgetLine, budget_allocation};
