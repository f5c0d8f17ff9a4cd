//! Financial statement tools.

pub mod statement;
pub mod trend;

pub use statement::{FinancialStatementParams, FinancialStatementTool};
pub use trend::{FinancialTrendParams, FinancialTrendTool};
