use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::errors::LlmError;
use crate::external::fmp::FmpProvider;
use crate::external::price_provider::PriceProvider;
use crate::external::synthetic::SyntheticProvider;
use crate::services::llm_service::OpenAiProvider;
use crate::services::narrative_service::{
    LlmNarrativeGenerator, NarrativeGenerator, TemplateNarrativeGenerator,
};

#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub narrator: Arc<dyn NarrativeGenerator>,
    pub fallback_narrator: Arc<dyn NarrativeGenerator>,
    pub fmp_configured: bool,
    pub openai_configured: bool,
}

impl AppState {
    /// Live providers where a key is configured, synthetic/template otherwise.
    pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
        let price_provider: Arc<dyn PriceProvider> = match &config.fmp_api_key {
            Some(key) => {
                info!("📊 Using price provider: Financial Modeling Prep");
                Arc::new(FmpProvider::new(key.clone(), config.fmp_base_url.clone()))
            }
            None => {
                info!("📊 No FMP_API_KEY found. Using synthetic price data");
                Arc::new(SyntheticProvider::new(config.synthetic_seed))
            }
        };

        let llm = OpenAiProvider::from_config(&config.llm)?;
        let openai_configured = llm.is_some();
        let narrator: Arc<dyn NarrativeGenerator> = match llm {
            Some(provider) => Arc::new(LlmNarrativeGenerator::new(Arc::new(provider))),
            None => Arc::new(TemplateNarrativeGenerator),
        };

        Ok(Self {
            price_provider,
            narrator,
            fallback_narrator: Arc::new(TemplateNarrativeGenerator),
            fmp_configured: config.fmp_api_key.is_some(),
            openai_configured,
        })
    }
}
