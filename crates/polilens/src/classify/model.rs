//! ONNX-backed multi-label chunk classification.
//!
//! Wraps exported OPP-115 sequence-classification checkpoints through ONNX
//! Runtime. Model and tokenizer files are downloaded from the Hugging Face
//! hub on first use and cached on disk; loaded sessions are memoized per
//! model key so concurrent requests share one instance.

use async_trait::async_trait;
use dashmap::DashMap;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::taxonomy;

/// Registered model checkpoints, keyed by short name.
pub const AVAILABLE_MODELS: [(&str, &str); 3] = [
    ("bert", "Hacktrix-121/bert-base-uncased-opp115-multilabel"),
    ("deberta", "Hacktrix-121/deberta-v3-base-opp115-multilabel"),
    ("deberta-v2", "Hacktrix-121/deberta-v3-base-opp115-multilabel-v2"),
];

/// Default model key when none (or an unknown one) is requested.
pub const DEFAULT_MODEL: &str = "deberta-v2";

/// Resolve a requested model key, falling back to the default for unknown keys.
pub fn resolve_model_key(key: &str) -> &'static str {
    AVAILABLE_MODELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(k, _)| *k)
        .unwrap_or(DEFAULT_MODEL)
}

/// Hub repository for a resolved model key.
fn repo_for_key(key: &str) -> &'static str {
    AVAILABLE_MODELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, repo)| *repo)
        .expect("resolved key is always registered")
}

/// Classifies one chunk of text into a fixed-size probability vector,
/// one entry per taxonomy category.
#[async_trait]
pub trait ChunkClassifier: Send + Sync {
    /// Classify `text`, returning probabilities ordered by taxonomy index.
    /// The returned vector always has exactly [`taxonomy::SIZE`] entries.
    async fn classify(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier for logging and response metadata.
    fn model(&self) -> &str;
}

/// ONNX Runtime classifier for one loaded checkpoint.
///
/// Session and tokenizer live behind an `Arc` so inference can move onto
/// the blocking pool without borrowing from the handler task.
pub struct OnnxClassifier {
    inner: Arc<ClassifierInner>,
    model_key: String,
    repo: String,
}

struct ClassifierInner {
    /// Session runs take `&mut`; the lock serializes inference per model.
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    max_length: usize,
}

impl OnnxClassifier {
    /// Load (downloading into the cache directory if needed) a classifier
    /// for a resolved model key.
    pub async fn load(model_key: &str, config: &ClassifierConfig) -> Result<Self> {
        let repo = repo_for_key(model_key);
        tracing::info!(model_key, repo, "loading classifier");

        let model_dir = config.cache_dir.join(model_key);
        std::fs::create_dir_all(&model_dir)
            .map_err(|e| Error::Config(format!("Failed to create cache directory: {}", e)))?;

        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            download_hub_file(repo, "onnx/model.onnx", &model_path).await?;
        }
        if !tokenizer_path.exists() {
            download_hub_file(repo, "tokenizer.json", &tokenizer_path).await?;
        }

        let session = Session::builder()
            .map_err(|e| Error::classifier(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::classifier(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::classifier(format!("Failed to set threads: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| Error::classifier(format!("Failed to load model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer: {}", e)))?;

        tracing::info!(model_key, "classifier ready");

        Ok(Self {
            inner: Arc::new(ClassifierInner {
                session: Mutex::new(session),
                tokenizer,
                max_length: config.max_length,
            }),
            model_key: model_key.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Hub repository backing this classifier.
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl ClassifierInner {
    fn classify_sync(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        let len = encoding.get_ids().len().min(self.max_length);
        let mut input_ids = vec![0i64; len];
        let mut attention_mask = vec![0i64; len];
        let mut token_type_ids = vec![0i64; len];

        for j in 0..len {
            input_ids[j] = encoding.get_ids()[j] as i64;
            attention_mask[j] = encoding.get_attention_mask()[j] as i64;
            token_type_ids[j] = encoding.get_type_ids()[j] as i64;
        }

        let input_ids_tensor = Tensor::from_array((vec![1, len], input_ids.into_boxed_slice()))
            .map_err(|e| Error::classifier(format!("Input tensor creation failed: {}", e)))?;
        let attention_mask_tensor =
            Tensor::from_array((vec![1, len], attention_mask.into_boxed_slice())).map_err(|e| {
                Error::classifier(format!("Attention mask tensor creation failed: {}", e))
            })?;
        let token_type_ids_tensor =
            Tensor::from_array((vec![1, len], token_type_ids.into_boxed_slice())).map_err(|e| {
                Error::classifier(format!("Token type tensor creation failed: {}", e))
            })?;

        let inputs = vec![
            ("input_ids", input_ids_tensor.into_dyn()),
            ("attention_mask", attention_mask_tensor.into_dyn()),
            ("token_type_ids", token_type_ids_tensor.into_dyn()),
        ];

        let mut session = self.session.lock();
        let outputs = session
            .run(inputs)
            .map_err(|e| Error::classifier(format!("Inference failed: {}", e)))?;

        let output_iter: Vec<_> = outputs.iter().collect();
        let output = output_iter
            .iter()
            .find(|(name, _)| *name == "logits")
            .or_else(|| output_iter.first())
            .map(|(_, v)| v)
            .ok_or_else(|| Error::classifier("No output tensor".to_string()))?;

        let (_, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::classifier(format!("Failed to extract tensor: {}", e)))?;

        if logits.len() != taxonomy::SIZE {
            return Err(Error::classifier(format!(
                "Model produced {} logits, expected {}",
                logits.len(),
                taxonomy::SIZE
            )));
        }

        Ok(logits.iter().map(|&x| sigmoid(x)).collect())
    }
}

#[async_trait]
impl ChunkClassifier for OnnxClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<f32>> {
        // Inference is CPU-bound and holds the session lock; keep it off
        // the async executor threads.
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        offload(move || inner.classify_sync(&text)).await
    }

    fn model(&self) -> &str {
        &self.model_key
    }
}

/// Run a CPU-bound operation on the blocking pool.
async fn offload<T, F>(operation: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| Error::classifier(format!("Inference task failed: {}", e)))?
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Hands out classifiers by model key. The pipeline depends on this trait
/// rather than the concrete registry, keeping model loading swappable.
#[async_trait]
pub trait ClassifierProvider: Send + Sync {
    /// Resolve `key` and return a ready classifier for it.
    async fn classifier(&self, key: &str) -> Result<Arc<dyn ChunkClassifier>>;
}

/// Lazy, memoized registry of loaded classifiers keyed by model key.
///
/// The first caller for a key pays the download/load cost; everyone after
/// shares the cached instance. Loads are serialized so a burst of requests
/// for a cold model does not load it twice.
pub struct ModelRegistry {
    config: ClassifierConfig,
    loaded: DashMap<String, Arc<OnnxClassifier>>,
    load_lock: tokio::sync::Mutex<()>,
}

impl ModelRegistry {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            loaded: DashMap::new(),
            load_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Get (loading if necessary) the classifier for `key`. Unknown keys
    /// resolve to the default model.
    pub async fn get(&self, key: &str) -> Result<Arc<OnnxClassifier>> {
        let key = resolve_model_key(key);
        if let Some(entry) = self.loaded.get(key) {
            return Ok(Arc::clone(&entry));
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished the load while we waited.
        if let Some(entry) = self.loaded.get(key) {
            return Ok(Arc::clone(&entry));
        }

        let classifier = Arc::new(OnnxClassifier::load(key, &self.config).await?);
        self.loaded.insert(key.to_string(), Arc::clone(&classifier));
        Ok(classifier)
    }

    /// Model keys currently registered (not necessarily loaded).
    pub fn available_keys(&self) -> Vec<&'static str> {
        AVAILABLE_MODELS.iter().map(|(k, _)| *k).collect()
    }

    /// Default model key.
    pub fn default_key(&self) -> &str {
        &self.config.default_model
    }
}

#[async_trait]
impl ClassifierProvider for ModelRegistry {
    async fn classifier(&self, key: &str) -> Result<Arc<dyn ChunkClassifier>> {
        let classifier: Arc<dyn ChunkClassifier> = self.get(key).await?;
        Ok(classifier)
    }
}

async fn download_hub_file(repo: &str, file: &str, path: &Path) -> Result<()> {
    let url = format!("https://huggingface.co/{}/resolve/main/{}", repo, file);
    tracing::info!(url, "downloading model file");

    let response = reqwest::get(&url)
        .await
        .map_err(|e| Error::classifier(format!("Failed to download {}: {}", file, e)))?;

    if !response.status().is_success() {
        return Err(Error::classifier(format!(
            "Download of {} failed: HTTP {}",
            file,
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::classifier(format!("Failed to read {}: {}", file, e)))?;

    std::fs::write(path, &bytes)
        .map_err(|e| Error::classifier(format!("Failed to save {}: {}", file, e)))?;

    tracing::info!(file, size = bytes.len(), "download complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve_to_themselves() {
        assert_eq!(resolve_model_key("bert"), "bert");
        assert_eq!(resolve_model_key("deberta"), "deberta");
        assert_eq!(resolve_model_key("deberta-v2"), "deberta-v2");
    }

    #[test]
    fn unknown_keys_fall_back_to_default() {
        assert_eq!(resolve_model_key("gpt-17"), DEFAULT_MODEL);
        assert_eq!(resolve_model_key(""), DEFAULT_MODEL);
    }

    #[test]
    fn sigmoid_maps_into_unit_interval() {
        assert!(sigmoid(-10.0) < 0.001);
        assert!(sigmoid(10.0) > 0.999);
        assert!((sigmoid(0.0) - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn offload_runs_off_the_async_thread() {
        let caller = std::thread::current().id();
        let worker = offload(move || Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(caller, worker);
    }

    #[tokio::test]
    async fn offload_propagates_operation_errors() {
        let result: Result<()> = offload(|| Err(Error::classifier("boom"))).await;
        assert!(result.is_err());
    }

    #[test]
    fn registry_lists_all_model_keys() {
        let registry = ModelRegistry::new(ClassifierConfig::default());
        assert_eq!(registry.available_keys(), vec!["bert", "deberta", "deberta-v2"]);
        assert_eq!(registry.default_key(), "deberta-v2");
    }
}
