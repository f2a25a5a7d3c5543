use figlytics_core::{FiglyticsError, Host, Result};

/// Host state described on the command line instead of read from an editor.
#[derive(Debug, Clone, Default)]
pub struct CliHost {
    pub plugin_id: Option<String>,
    pub document_name: Option<String>,
    pub page_name: String,
    pub editor_type: Option<String>,
    pub payments_status: Option<String>,
    pub page_element_count: usize,
    pub selection_count: usize,
}

impl Host for CliHost {
    fn plugin_id(&self) -> Option<String> {
        self.plugin_id.clone()
    }

    fn document_name(&self) -> Option<String> {
        self.document_name.clone()
    }

    fn page_name(&self) -> String {
        self.page_name.clone()
    }

    fn editor_type(&self) -> Option<String> {
        self.editor_type.clone()
    }

    fn payments_status(&self) -> Result<String> {
        self.payments_status
            .clone()
            .ok_or(FiglyticsError::HostCapabilityAbsent {
                capability: "payments",
            })
    }

    fn page_element_count(&self) -> usize {
        self.page_element_count
    }

    fn selection_count(&self) -> usize {
        self.selection_count
    }
}
