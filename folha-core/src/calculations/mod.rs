//! Payroll calculations: bracket evaluation, earnings, deductions and the
//! payslip built from their result.

pub mod brackets;
pub mod common;
pub mod deductions;
pub mod earnings;
pub mod payroll;
pub mod payslip;

pub use brackets::{BracketMode, BracketTableError};
pub use payroll::PayrollCalculator;
pub use payslip::{Payslip, PayslipLine};
