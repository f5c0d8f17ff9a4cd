//! Company tools: directory search, overview, executives and shareholders.

pub mod executives;
pub mod overview;
pub mod search;
pub mod shareholders;

pub use executives::{ExecutivesParams, ExecutivesTool};
pub use overview::{CompanyOverviewParams, CompanyOverviewTool};
pub use search::{SearchCompanyParams, SearchCompanyTool};
pub use shareholders::{ShareholdersParams, ShareholdersTool};
