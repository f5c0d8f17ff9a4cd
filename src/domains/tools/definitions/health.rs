//! Server health: key configuration and cache occupancy.

use std::sync::Arc;

use rmcp::handler::server::tool::{ToolRoute, cached_schema_for_type};
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::domains::dart::UpstreamResult;
use crate::domains::tools::common::dispatch_route;
use crate::domains::tools::dispatcher::Dispatcher;

/// Takes no parameters besides the optional `env` credentials section.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HealthParams {}

#[derive(Debug, Clone)]
pub struct HealthTool;

impl HealthTool {
    pub const NAME: &'static str = "health";

    pub const DESCRIPTION: &'static str = "Check the server: whether a DART API key is available (and where it comes from) and how full the response cache is. Never calls the upstream API.";

    /// Report health. Never fails and never touches the upstream.
    pub fn run(dispatcher: &Dispatcher, arguments: &Value) -> UpstreamResult {
        let purged = dispatcher.cache().purge_expired();
        if purged > 0 {
            debug!("Purged expired cache entries | count={}", purged);
        }

        let credentials = dispatcher.resolver().resolve(arguments);
        let key_status = if credentials.is_present() {
            "configured"
        } else {
            "not configured"
        };

        UpstreamResult::json(json!({
            "status": "ok",
            "environment": {
                "dart_api_key": key_status,
                "source": credentials.source().as_str(),
            },
            "cache": {
                "entries": dispatcher.cache().len(),
                "capacity": dispatcher.cache().capacity(),
            },
        }))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<HealthParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    pub fn create_route<S>(dispatcher: Arc<Dispatcher>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        dispatch_route(Self::to_tool(), dispatcher)
    }
}
