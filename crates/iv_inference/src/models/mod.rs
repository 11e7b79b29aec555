use std::sync::Arc;
use iv_core::config::ModelConfig;
use iv_core::ChatModel;
use tracing::{info, warn};

pub mod deepseek;
pub mod disabled;

pub use deepseek::DeepSeekModel;
pub use disabled::DisabledModel;

/// Picks the chat backend for `config`. Missing credentials select the
/// disabled model, which routes callers onto their fallback paths.
pub fn create_model(config: &ModelConfig) -> Arc<dyn ChatModel> {
    if !config.has_credentials() {
        info!("🔌 No API key configured, language model disabled");
        return Arc::new(DisabledModel::new("no API key configured"));
    }
    match DeepSeekModel::new(config) {
        Ok(model) => {
            info!("🤖 Using {} ({})", config.model_name, config.base_url);
            Arc::new(model)
        }
        Err(e) => {
            warn!("Failed to initialize language model: {}", e);
            Arc::new(DisabledModel::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_selects_disabled_model() {
        let model = create_model(&ModelConfig::default());
        assert!(!model.is_available());
        assert_eq!(model.name(), "Disabled");
    }

    #[test]
    fn test_key_selects_deepseek() {
        let config = ModelConfig {
            api_key: Some("sk-test".to_string()),
            ..ModelConfig::default()
        };
        let model = create_model(&config);
        assert!(model.is_available());
        assert_eq!(model.name(), "deepseek-chat");
    }
}
