pub mod calculations;
pub mod db;
pub mod input;
pub mod models;

pub use calculations::{PayrollCalculator, Payslip};
pub use db::repository::{PayrollRepository, RepositoryError};
pub use models::*;
