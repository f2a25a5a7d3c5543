use serde::Serialize;

use crate::host::Host;

pub const NOT_FOUND: &str = "Not found";
pub const NOT_ENABLED: &str = "Not enabled";

/// Host environment facts captured once at startup and shared by every event
/// of the session. Later changes in the host are not reflected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    pub document_name: String,
    pub page_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_type: Option<String>,
    pub payments_status_type: String,
    pub current_page_element_count: usize,
    #[serde(rename = "currentPageCurrentlySelectedElementCount")]
    pub current_selection_count: usize,
}

impl MetadataSnapshot {
    pub fn capture(host: &dyn Host) -> Self {
        let page_name = host.page_name();
        let payments_status_type = match host.payments_status() {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!(error = %e, "payments status unavailable");
                NOT_ENABLED.to_string()
            }
        };

        Self {
            plugin_id: host.plugin_id(),
            document_name: host
                .document_name()
                .unwrap_or_else(|| NOT_FOUND.to_string()),
            page_name: if page_name.is_empty() {
                NOT_FOUND.to_string()
            } else {
                page_name
            },
            editor_type: host.editor_type(),
            payments_status_type,
            current_page_element_count: host.page_element_count(),
            current_selection_count: host.selection_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FiglyticsError, Result};

    struct BareHost;

    impl Host for BareHost {
        fn plugin_id(&self) -> Option<String> {
            None
        }
        fn document_name(&self) -> Option<String> {
            None
        }
        fn page_name(&self) -> String {
            String::new()
        }
        fn editor_type(&self) -> Option<String> {
            Some("figma".to_string())
        }
        fn payments_status(&self) -> Result<String> {
            Err(FiglyticsError::HostCapabilityAbsent {
                capability: "payments",
            })
        }
        fn page_element_count(&self) -> usize {
            3
        }
        fn selection_count(&self) -> usize {
            1
        }
    }

    #[test]
    fn missing_capabilities_become_sentinels() {
        let snapshot = MetadataSnapshot::capture(&BareHost);
        assert_eq!(snapshot.document_name, NOT_FOUND);
        assert_eq!(snapshot.page_name, NOT_FOUND);
        assert_eq!(snapshot.payments_status_type, NOT_ENABLED);
        assert_eq!(snapshot.current_page_element_count, 3);
        assert_eq!(snapshot.current_selection_count, 1);
    }

    #[test]
    fn serializes_with_ingestion_field_names() {
        let json = serde_json::to_value(MetadataSnapshot::capture(&BareHost)).unwrap();
        assert!(json.get("pluginId").is_none());
        assert_eq!(json["editorType"], "figma");
        assert_eq!(json["paymentsStatusType"], NOT_ENABLED);
        assert_eq!(json["currentPageCurrentlySelectedElementCount"], 1);
    }
}
