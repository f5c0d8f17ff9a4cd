//! Tool definitions module.
//!
//! One file per tool, grouped by upstream area. Every tool exposes `NAME`,
//! `DESCRIPTION`, `run`, `to_tool` and `create_route`.

pub mod company;
pub mod disclosure;
pub mod finance;
pub mod health;

pub use company::{
    CompanyOverviewParams, CompanyOverviewTool, ExecutivesParams, ExecutivesTool,
    SearchCompanyParams, SearchCompanyTool, ShareholdersParams, ShareholdersTool,
};
pub use disclosure::{
    DisclosureDocumentParams, DisclosureDocumentTool, MajorReportParams, MajorReportTool,
    PublicDisclosureParams, PublicDisclosureTool,
};
pub use finance::{
    FinancialStatementParams, FinancialStatementTool, FinancialTrendParams, FinancialTrendTool,
};
pub use health::{HealthParams, HealthTool};
