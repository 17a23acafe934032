//! Analysis and chat orchestration.
//!
//! The pipeline composes the ingestion, classification, generation, and
//! chat stages as plain functions over immutable inputs. There is no
//! shared conversation record threaded through the stages; every stage
//! takes what it needs and returns a new value, and the request carries
//! any cross-request context (prior chunks) explicitly.

use std::sync::Arc;

use crate::chatbot::{
    build_response, detect_intent, handle_instruction_query, handle_off_topic, handle_rag_query,
    ChatResponse, Intent, ResponseType,
};
use crate::classify::{aggregate, resolve_model_key, score_chunks, AggregatedResult};
use crate::classify::{ClassifierProvider, ModelRegistry};
use crate::config::PolilensConfig;
use crate::error::{Error, Result};
use crate::generation::{GroqClient, LlmProvider, PromptBuilder};
use crate::ingestion::{ParagraphSource, PolicyScraper, Segmenter};
use crate::types::{AnalysisResponse, PipelineRequest};

/// Policy text fed to the summarization prompt is truncated to this many
/// characters to stay inside the generation context window.
const SUMMARY_INPUT_CHARS: usize = 15_000;

/// Explanation returned without an LLM call when nothing was detected.
const DEFAULT_EXPLANATION: &str =
    "No specific privacy practice categories were detected in this document.";

/// Summary returned without an LLM call when no text survived segmentation.
const DEFAULT_SUMMARY: &str = "No policy text was available to summarize.";

/// Which path a pipeline request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A document source is present: scrape (if URL), segment, classify,
    /// aggregate, explain, summarize
    Analysis,
    /// A user message is present: route intent and answer
    Chat,
    /// Neither input is present
    Rejected,
}

impl PipelineRequest {
    /// Entry routing. A document source wins over a chat message when a
    /// request carries both.
    pub fn route(&self) -> Route {
        if self.url.is_some() || self.text.is_some() {
            Route::Analysis
        } else if self.user_message.is_some() {
            Route::Chat
        } else {
            Route::Rejected
        }
    }
}

/// Output of a routed pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineResponse {
    Analysis(Box<AnalysisResponse>),
    Chat(ChatResponse),
}

/// The assembled pipeline. Collaborators are trait objects so tests (and
/// alternative deployments) can swap any of them out.
pub struct PolicyPipeline {
    scraper: Arc<dyn ParagraphSource>,
    models: Arc<dyn ClassifierProvider>,
    llm: Arc<dyn LlmProvider>,
    segmenter: Segmenter,
    default_model: String,
}

impl PolicyPipeline {
    pub fn new(
        config: &PolilensConfig,
        scraper: Arc<dyn ParagraphSource>,
        models: Arc<dyn ClassifierProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            scraper,
            models,
            llm,
            segmenter: Segmenter::new(config.chunking.clone()),
            default_model: config.classifier.default_model.clone(),
        }
    }

    /// Wire up the production collaborators from configuration.
    pub fn from_config(config: &PolilensConfig) -> Result<Self> {
        let scraper = Arc::new(PolicyScraper::new(config.scraper.clone()));
        let models = Arc::new(ModelRegistry::new(config.classifier.clone()));
        let llm = Arc::new(GroqClient::new(&config.llm)?);
        Ok(Self::new(config, scraper, models, llm))
    }

    /// Run a routed request end to end.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineResponse> {
        match request.route() {
            Route::Analysis => {
                let model = request.model.as_deref();
                let response = if let Some(url) = &request.url {
                    self.analyze_url(url, model).await?
                } else {
                    // route() guarantees text is present here
                    let text = request.text.as_deref().unwrap_or_default();
                    self.analyze_text(text, model).await?
                };
                Ok(PipelineResponse::Analysis(Box::new(response)))
            }
            Route::Chat => {
                let message = request.user_message.as_deref().unwrap_or_default();
                let response = self.chat(message, &request.chunks).await?;
                Ok(PipelineResponse::Chat(response))
            }
            Route::Rejected => Err(Error::InvalidRequest(
                "request carries neither a document source nor a user message".to_string(),
            )),
        }
    }

    /// Analyze the policy behind a URL. Scrape failures surface as an
    /// empty paragraph list and flow through as an empty result.
    pub async fn analyze_url(&self, url: &str, model: Option<&str>) -> Result<AnalysisResponse> {
        tracing::info!(url, "starting URL analysis");
        let paragraphs = self.scraper.fetch(url).await;
        tracing::info!(url, paragraphs = paragraphs.len(), "scrape complete");
        let chunks = self.segmenter.segment(&paragraphs);
        self.finish_analysis(chunks, Some(url.to_string()), model)
            .await
    }

    /// Analyze pasted policy text.
    pub async fn analyze_text(&self, text: &str, model: Option<&str>) -> Result<AnalysisResponse> {
        tracing::info!(chars = text.len(), "starting text analysis");
        let chunks = self.segmenter.segment_text(text);
        self.finish_analysis(chunks, None, model).await
    }

    async fn finish_analysis(
        &self,
        chunks: Vec<String>,
        url: Option<String>,
        model: Option<&str>,
    ) -> Result<AnalysisResponse> {
        let model_key = resolve_model_key(model.unwrap_or(&self.default_model));
        tracing::info!(chunks = chunks.len(), model_key, "classifying document");

        let aggregated = if chunks.is_empty() {
            AggregatedResult::default()
        } else {
            let classifier = self.models.classifier(model_key).await?;
            let scored = score_chunks(&*classifier, &chunks).await?;
            aggregate(&scored)
        };
        tracing::info!(detected = aggregated.labels.len(), "aggregation complete");

        let explanation = self.explain(&aggregated).await?;
        let summary = self.summarize(&chunks).await?;

        Ok(AnalysisResponse::assemble(
            aggregated,
            explanation,
            summary,
            chunks,
            url,
            model_key.to_string(),
        ))
    }

    /// Explain the detected practices, or return the fixed default without
    /// an LLM call when nothing was detected.
    async fn explain(&self, aggregated: &AggregatedResult) -> Result<String> {
        if aggregated.labels.is_empty() {
            return Ok(DEFAULT_EXPLANATION.to_string());
        }
        let context =
            PromptBuilder::build_explanation_context(&aggregated.labels, &aggregated.relevant_chunks);
        self.llm
            .generate(&PromptBuilder::build_explanation_prompt(&context))
            .await
    }

    /// Summarize the policy text, or return the fixed default without an
    /// LLM call when no chunks survived.
    async fn summarize(&self, chunks: &[String]) -> Result<String> {
        if chunks.is_empty() {
            return Ok(DEFAULT_SUMMARY.to_string());
        }
        let text: String = chunks.join("\n").chars().take(SUMMARY_INPUT_CHARS).collect();
        self.llm
            .generate(&PromptBuilder::build_summary_prompt(&text))
            .await
    }

    /// Probe the generation backend. Used by the server binary at startup.
    pub async fn llm_health(&self) -> bool {
        self.llm.health_check().await.unwrap_or(false)
    }

    /// Answer a chat message: route intent, dispatch the matching handler,
    /// and normalize into the chat envelope.
    pub async fn chat(&self, message: &str, chunks: &[String]) -> Result<ChatResponse> {
        let intent = detect_intent(message, &*self.llm).await;
        tracing::info!(?intent, chunks = chunks.len(), "chat message routed");

        let (answer, response_type) = match intent {
            Intent::RagQuestion => (
                handle_rag_query(message, chunks, &*self.llm).await?,
                ResponseType::Rag,
            ),
            Intent::Instruction => (handle_instruction_query(message), ResponseType::Instruction),
            Intent::OffTopic => (handle_off_topic(message), ResponseType::Guardrail),
        };

        Ok(build_response(answer, response_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ChunkClassifier;
    use crate::taxonomy::{self, RiskTier};
    use async_trait::async_trait;

    /// Scraper returning a fixed paragraph list.
    struct StubScraper {
        paragraphs: Vec<String>,
    }

    #[async_trait]
    impl ParagraphSource for StubScraper {
        async fn fetch(&self, _url: &str) -> Vec<String> {
            self.paragraphs.clone()
        }
    }

    /// Classifier scoring 0.6 on index 0 for chunks mentioning "collect",
    /// background noise everywhere else.
    struct StubClassifier;

    #[async_trait]
    impl ChunkClassifier for StubClassifier {
        async fn classify(&self, text: &str) -> Result<Vec<f32>> {
            let mut scores = vec![0.1f32; taxonomy::SIZE];
            if text.to_lowercase().contains("collect") {
                scores[0] = 0.6;
            }
            Ok(scores)
        }
        fn model(&self) -> &str {
            "stub"
        }
    }

    struct StubProvider;

    #[async_trait]
    impl ClassifierProvider for StubProvider {
        async fn classifier(&self, _key: &str) -> Result<Arc<dyn ChunkClassifier>> {
            Ok(Arc::new(StubClassifier))
        }
    }

    /// LLM echoing a canned reply per call.
    struct StubLlm {
        reply: &'static str,
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.to_string())
        }
        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
        fn name(&self) -> &str {
            "stub"
        }
        fn model(&self) -> &str {
            "stub"
        }
    }

    fn pipeline_with(paragraphs: Vec<String>, reply: &'static str) -> PolicyPipeline {
        PolicyPipeline::new(
            &PolilensConfig::default(),
            Arc::new(StubScraper { paragraphs }),
            Arc::new(StubProvider),
            Arc::new(StubLlm { reply }),
        )
    }

    fn policy_paragraph() -> String {
        // Long enough to survive the minimum-chunk filter, and it carries
        // the verb evidence the validator looks for.
        "We collect your email address and browsing history. \
         This information is used to provide and improve the service."
            .to_string()
    }

    #[test]
    fn routing_prefers_document_source_over_chat() {
        assert_eq!(PipelineRequest::for_url("http://x").route(), Route::Analysis);
        assert_eq!(PipelineRequest::for_text("text").route(), Route::Analysis);
        assert_eq!(
            PipelineRequest::for_chat("hi", Vec::new()).route(),
            Route::Chat
        );
        assert_eq!(PipelineRequest::default().route(), Route::Rejected);

        let mut both = PipelineRequest::for_url("http://x");
        both.user_message = Some("hi".to_string());
        assert_eq!(both.route(), Route::Analysis);
    }

    #[tokio::test]
    async fn rejected_requests_are_invalid() {
        let pipeline = pipeline_with(Vec::new(), "");
        let result = pipeline.run(PipelineRequest::default()).await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn url_analysis_detects_first_party_collection() {
        let pipeline = pipeline_with(vec![policy_paragraph()], "generated");
        let response = pipeline
            .analyze_url("https://example.com/privacy", None)
            .await
            .unwrap();

        assert_eq!(response.labels, vec!["First Party Collection/Use"]);
        assert_eq!(response.risks, vec![RiskTier::Medium]);
        assert_eq!(response.scores[0], 0.6);
        assert_eq!(response.url.as_deref(), Some("https://example.com/privacy"));
        assert_eq!(response.model_used, "deberta-v2");
        assert_eq!(response.chunk_count, response.chunks.len());
        assert!(!response.chunks.is_empty());
        assert!(response.relevant_chunks["First Party Collection/Use"].contains("collect"));
        // Both generation stages went through the LLM
        assert_eq!(response.explanation, "generated");
        assert_eq!(response.summary, "generated");
    }

    #[tokio::test]
    async fn text_analysis_has_no_url() {
        let pipeline = pipeline_with(Vec::new(), "generated");
        let response = pipeline
            .analyze_text(&policy_paragraph(), Some("bert"))
            .await
            .unwrap();
        assert!(response.url.is_none());
        assert_eq!(response.model_used, "bert");
        assert_eq!(response.labels, vec!["First Party Collection/Use"]);
    }

    #[tokio::test]
    async fn unknown_model_key_resolves_to_default() {
        let pipeline = pipeline_with(Vec::new(), "generated");
        let response = pipeline
            .analyze_text(&policy_paragraph(), Some("no-such-model"))
            .await
            .unwrap();
        assert_eq!(response.model_used, "deberta-v2");
    }

    #[tokio::test]
    async fn failed_scrape_yields_empty_result_with_defaults() {
        let pipeline = pipeline_with(Vec::new(), "should not be called");
        let response = pipeline
            .analyze_url("https://example.com/404", None)
            .await
            .unwrap();

        assert!(response.labels.is_empty());
        assert!(response.chunks.is_empty());
        assert_eq!(response.chunk_count, 0);
        assert_eq!(response.explanation, DEFAULT_EXPLANATION);
        assert_eq!(response.summary, DEFAULT_SUMMARY);
    }

    #[tokio::test]
    async fn chat_without_context_returns_guidance_as_rag() {
        let pipeline = pipeline_with(Vec::new(), "unused");
        let response = pipeline
            .chat("What data do they collect about me?", &[])
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::Rag);
        assert!(response.answer.contains("analyze a privacy policy first"));
        assert_eq!(response.sources, vec!["Policy Text"]);
        assert!(response.risks.is_empty());
    }

    #[tokio::test]
    async fn chat_with_context_answers_from_llm() {
        let pipeline = pipeline_with(Vec::new(), "Your email address is collected.");
        let chunks = vec![policy_paragraph()];
        let response = pipeline
            .chat("What data do they collect?", &chunks)
            .await
            .unwrap();

        assert_eq!(response.response_type, ResponseType::Rag);
        assert_eq!(response.answer, "Your email address is collected.");
        assert_eq!(response.sources, vec!["Policy Text"]);
    }

    #[tokio::test]
    async fn instruction_messages_get_the_static_handler() {
        let pipeline = pipeline_with(Vec::new(), "unused");
        let response = pipeline.chat("How to use this?", &[]).await.unwrap();
        assert_eq!(response.response_type, ResponseType::Instruction);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn off_topic_messages_hit_the_guardrail() {
        // No keyword match; the stub fallback classifies it off-topic
        let pipeline = pipeline_with(Vec::new(), "OFF_TOPIC");
        let response = pipeline.chat("Sing me a song", &[]).await.unwrap();
        assert_eq!(response.response_type, ResponseType::Guardrail);
        assert!(response.answer.contains("privacy policy assistant"));
    }

    #[tokio::test]
    async fn chat_via_run_wraps_the_envelope() {
        let pipeline = pipeline_with(Vec::new(), "unused");
        let request = PipelineRequest::for_chat("how to use this tool", Vec::new());
        match pipeline.run(request).await.unwrap() {
            PipelineResponse::Chat(response) => {
                assert_eq!(response.response_type, ResponseType::Instruction);
            }
            PipelineResponse::Analysis(_) => panic!("expected chat response"),
        }
    }
}
