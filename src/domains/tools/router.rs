//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; every route forwards to the
//! shared dispatcher.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{
    CompanyOverviewTool, DisclosureDocumentTool, ExecutivesTool, FinancialStatementTool,
    FinancialTrendTool, HealthTool, MajorReportTool, PublicDisclosureTool, SearchCompanyTool,
    ShareholdersTool,
};
use super::dispatcher::Dispatcher;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(dispatcher: Arc<Dispatcher>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(HealthTool::create_route(dispatcher.clone()))
        .with_route(SearchCompanyTool::create_route(dispatcher.clone()))
        .with_route(CompanyOverviewTool::create_route(dispatcher.clone()))
        .with_route(FinancialStatementTool::create_route(dispatcher.clone()))
        .with_route(FinancialTrendTool::create_route(dispatcher.clone()))
        .with_route(PublicDisclosureTool::create_route(dispatcher.clone()))
        .with_route(MajorReportTool::create_route(dispatcher.clone()))
        .with_route(DisclosureDocumentTool::create_route(dispatcher.clone()))
        .with_route(ExecutivesTool::create_route(dispatcher.clone()))
        .with_route(ShareholdersTool::create_route(dispatcher))
}
