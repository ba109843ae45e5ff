//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::conversation::ConversationState;
use crate::error::ExtractorError;
use crate::extraction::ExtractionLoop;
use crate::prompt::{system_prompt, PromptBuilder};
use crate::types::ExtractionReport;
use statsift_document::Document;
use statsift_domain::ReasoningService;
use statsift_llm::{ResilientInvoker, Sleeper, TokioSleeper};
use std::sync::Arc;
use tracing::{debug, info};

/// Extracts statistical findings from papers with a reasoning service
///
/// One `Extractor` can serve many documents, also concurrently: every call to
/// [`Extractor::extract`] builds its own conversation, accumulator and loop.
pub struct Extractor<S: ?Sized, Z = TokioSleeper> {
    service: Arc<S>,
    sleeper: Z,
    config: ExtractorConfig,
}

impl<S> Extractor<S, TokioSleeper>
where
    S: ReasoningService + ?Sized,
{
    /// Create an extractor that waits on the tokio timer
    pub fn new(service: Arc<S>, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_sleeper(service, TokioSleeper, config)
    }
}

impl<S, Z> Extractor<S, Z>
where
    S: ReasoningService + ?Sized,
    Z: Sleeper + Clone,
{
    /// Create an extractor with a custom sleeper
    pub fn with_sleeper(
        service: Arc<S>,
        sleeper: Z,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            service,
            sleeper,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Name of the model behind the service
    pub fn model_name(&self) -> &str {
        self.service.model_name()
    }

    /// Build the loop for a document without running it
    ///
    /// # Errors
    ///
    /// [`ExtractorError::Document`] if the paper has no title or abstract.
    pub fn prepare<'a>(&self, document: &'a Document) -> Result<ExtractionLoop<'a, S, Z>, ExtractorError> {
        let index = document.index();
        let task = PromptBuilder::new(document.title()?, document.abstract_text()?, &index)
            .with_persona(self.config.include_persona)
            .build();
        debug!("Task prompt length: {} chars", task.len());

        let invoker = ResilientInvoker::new(
            Arc::clone(&self.service),
            self.sleeper.clone(),
            self.config.retry.clone(),
        );

        Ok(ExtractionLoop::new(
            invoker,
            document,
            ConversationState::new(system_prompt(), task),
            self.config.max_round_trips,
        ))
    }

    /// Run the extraction loop over a document to completion
    pub async fn extract(&self, document: &Document) -> Result<ExtractionReport, ExtractorError> {
        let extraction = self.prepare(document)?;
        info!(
            model = self.model_name(),
            budget = self.config.max_round_trips,
            "Starting extraction"
        );
        extraction.run().await
    }
}
