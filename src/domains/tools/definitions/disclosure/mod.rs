//! Disclosure tools: filing list, major event reports, original documents.

pub mod document;
pub mod list;
pub mod major_report;

pub use document::{DisclosureDocumentParams, DisclosureDocumentTool};
pub use list::{PublicDisclosureParams, PublicDisclosureTool};
pub use major_report::{MajorReportParams, MajorReportTool};
