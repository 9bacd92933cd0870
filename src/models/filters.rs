use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label of the default relevance filter on the opportunities view.
pub const DEFAULT_FILTER: &str = "All relevant";

/// Number of job results requested unless the user changes it.
pub const DEFAULT_RESULT_LIMIT: u32 = 20;

/// Search and UI state shared by the opportunities views.
///
/// A passive blackboard: no validation, no derived fields. Views read and
/// write it directly through [`crate::stores::FilterStore`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OpportunityFilters {
    pub filter: String,
    pub search_query: String,
    pub input_location: String,
    pub cv_text: String,
    pub selected_file_name: String,
    pub result_limit: u32,
    pub jobs: Vec<Value>,

    // UI state
    pub is_uploading: bool,
    pub is_loading: bool,
    pub is_parsing_pdf: bool,

    // Adapted CV modal
    pub show_adapt_modal: bool,
    pub is_adapting_cv: bool,
    pub adapting_job_id: Option<String>,
    pub adapted_data: Option<Value>,

    /// Job whose radar view is currently loading.
    pub loading_radar_for: Option<String>,
}

impl Default for OpportunityFilters {
    fn default() -> Self {
        OpportunityFilters {
            filter: DEFAULT_FILTER.to_string(),
            search_query: String::new(),
            input_location: String::new(),
            cv_text: String::new(),
            selected_file_name: String::new(),
            result_limit: DEFAULT_RESULT_LIMIT,
            jobs: Vec::new(),
            is_uploading: false,
            is_loading: false,
            is_parsing_pdf: false,
            show_adapt_modal: false,
            is_adapting_cv: false,
            adapting_job_id: None,
            adapted_data: None,
            loading_radar_for: None,
        }
    }
}
