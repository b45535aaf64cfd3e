use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::llm::{self, EmbeddingGateway, GenerationGateway};
use crate::rag::{ContextBuilder, ContextBuilderConfig, RetrievalConfig, RetrievalEngine, Summarizer};

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub settings: Arc<Settings>,
    pub engine: RetrievalEngine,
    pub summarizer: Summarizer,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());
        let settings = config.settings()?;

        let embedder = llm::embedding_gateway(&settings.embedding);
        let generator = llm::generation_gateway(&settings.generation);

        Ok(Arc::new(Self::from_parts(
            paths, config, settings, embedder, generator,
        )))
    }

    /// Wires the engine and summarizer from already-built gateways.
    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: ConfigService,
        settings: Settings,
        embedder: EmbeddingGateway,
        generator: GenerationGateway,
    ) -> Self {
        let engine = RetrievalEngine::new(embedder, RetrievalConfig::from(&settings.retrieval));
        let context = ContextBuilder::new(ContextBuilderConfig {
            max_context_chars: settings.retrieval.max_context_chars,
            include_sections: true,
        });
        let summarizer = Summarizer::new(engine.clone(), generator, context);

        AppState {
            paths,
            config,
            settings: Arc::new(settings),
            engine,
            summarizer,
            started_at: Utc::now(),
        }
    }
}
