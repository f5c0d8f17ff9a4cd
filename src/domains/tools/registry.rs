//! Tool Registry - the list of tools and the name-based entry point.
//!
//! This module provides:
//! - The list of all available tools and their metadata
//! - Name lookup used by the dispatcher to reject unknown tools
//! - HTTP dispatch for tool calls (when http feature is enabled)

use std::sync::Arc;

use rmcp::model::Tool;

use super::definitions::{
    CompanyOverviewTool, DisclosureDocumentTool, ExecutivesTool, FinancialStatementTool,
    FinancialTrendTool, HealthTool, MajorReportTool, PublicDisclosureTool, SearchCompanyTool,
    ShareholdersTool,
};
use super::dispatcher::Dispatcher;

/// Names of every registered tool.
const TOOL_NAMES: [&str; 10] = [
    HealthTool::NAME,
    SearchCompanyTool::NAME,
    CompanyOverviewTool::NAME,
    FinancialStatementTool::NAME,
    FinancialTrendTool::NAME,
    PublicDisclosureTool::NAME,
    MajorReportTool::NAME,
    DisclosureDocumentTool::NAME,
    ExecutivesTool::NAME,
    ShareholdersTool::NAME,
];

/// Tool registry - manages all available tools.
///
/// Calls go through the shared [`Dispatcher`], so the HTTP and MCP transports
/// use the same cache.
pub struct ToolRegistry {
    dispatcher: Arc<Dispatcher>,
}

impl ToolRegistry {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        TOOL_NAMES.to_vec()
    }

    pub fn is_known(name: &str) -> bool {
        TOOL_NAMES.contains(&name)
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            HealthTool::to_tool(),
            SearchCompanyTool::to_tool(),
            CompanyOverviewTool::to_tool(),
            FinancialStatementTool::to_tool(),
            FinancialTrendTool::to_tool(),
            PublicDisclosureTool::to_tool(),
            MajorReportTool::to_tool(),
            DisclosureDocumentTool::to_tool(),
            ExecutivesTool::to_tool(),
            ShareholdersTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call and render it as plain JSON.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let result = self.dispatcher.invoke(name, arguments).await;
        super::common::to_rest(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::dispatcher::tests::dispatcher;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_registry_tool_names() {
        let server = MockServer::start().await;
        let registry = ToolRegistry::new(Arc::new(dispatcher(&server)));
        let names = registry.tool_names();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"health"));
        assert!(names.contains(&"search_company_tool"));
        assert!(names.contains(&"get_company_overview_tool"));
        assert!(names.contains(&"get_financial_statement_tool"));
        assert!(names.contains(&"analyze_financial_trend_tool"));
        assert!(names.contains(&"get_public_disclosure_tool"));
        assert!(names.contains(&"get_major_report_tool"));
        assert!(names.contains(&"download_disclosure_document_tool"));
        assert!(names.contains(&"get_executives_tool"));
        assert!(names.contains(&"get_shareholders_tool"));
    }

    #[test]
    fn test_metadata_matches_names() {
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), TOOL_NAMES.len());
        for tool in &tools {
            assert!(ToolRegistry::is_known(tool.name.as_ref()));
            assert!(tool.description.is_some());
        }
        assert!(!ToolRegistry::is_known("fs_delete"));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_health() {
        let server = MockServer::start().await;
        let registry = ToolRegistry::new(Arc::new(dispatcher(&server)));
        let result = registry.call_tool("health", serde_json::json!({})).await;
        assert_eq!(result.unwrap()["status"], "ok");
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_registry_call_unknown() {
        let server = MockServer::start().await;
        let registry = ToolRegistry::new(Arc::new(dispatcher(&server)));
        let result = registry.call_tool("unknown", serde_json::json!({})).await;
        assert!(result.unwrap_err().contains("unknown"));
    }
}
