use std::sync::Arc;

use ascent_client::config::{load_config_from, ConfigV1};
use ascent_client::oauth::{ButtonOptions, IdentityConfig, IdentitySdk, PromptOutcome};
use ascent_client::startup::build_state;
use ascent_client::state::ClientState;
use async_trait::async_trait;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use std::sync::Mutex;

pub fn test_config(api_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api_url: "{api_url}"
google_client_id: "1234-abc.apps.googleusercontent.com"
storage:
  type: memory
logging:
  level: "debug"
  format: "json"
"#
    );
    load_config_from(Figment::from(Yaml::string(&yaml))).expect("test config should parse")
}

pub fn build_client(api_url: &str) -> ClientState {
    build_state(test_config(api_url))
}

/// An identity SDK that is loaded from the start and answers every prompt
/// with the same outcome.
pub struct ScriptedSdk {
    pub outcome: PromptOutcome,
    pub initialized: Mutex<Option<IdentityConfig>>,
}

impl ScriptedSdk {
    pub fn new(outcome: PromptOutcome) -> Arc<Self> {
        Arc::new(ScriptedSdk {
            outcome,
            initialized: Mutex::new(None),
        })
    }
}

#[async_trait]
impl IdentitySdk for ScriptedSdk {
    fn is_loaded(&self) -> bool {
        true
    }

    fn initialize(&self, config: IdentityConfig) {
        *self.initialized.lock().unwrap() = Some(config);
    }

    fn has_element(&self, _element_id: &str) -> bool {
        false
    }

    fn render_button(&self, _element_id: &str, _options: &ButtonOptions) {}

    async fn prompt(&self) -> PromptOutcome {
        self.outcome.clone()
    }
}
