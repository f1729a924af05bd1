use std::path::Path;
use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use super::{ModelLoader, SummaryModel};
use crate::config::ModelConfig;
use crate::{Error, Result};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Fetches a T5-family checkpoint from the Hugging Face hub (or its local cache)
pub struct T5Loader {
    settings: ModelConfig,
}

impl T5Loader {
    pub fn new(settings: ModelConfig) -> Self {
        Self { settings }
    }
}

impl ModelLoader for T5Loader {
    type Model = T5Summarizer;

    fn load(&self) -> Result<T5Summarizer> {
        let mut builder = ApiBuilder::new().with_progress(false);
        if let Some(dir) = self.settings.cache_dir() {
            builder = builder.with_cache_dir(dir);
        }
        let api = builder
            .build()
            .map_err(|e| Error::ModelStore(e.to_string()))?;

        let repo = api.repo(Repo::with_revision(
            self.settings.model_id.clone(),
            RepoType::Model,
            self.settings.revision.clone(),
        ));

        tracing::info!(
            "Resolving model {}@{}",
            self.settings.model_id,
            self.settings.revision
        );

        let fetch = |name: &str| {
            repo.get(name)
                .map_err(|e| Error::ModelStore(format!("{} ({}): {}", name, self.settings.model_id, e)))
        };
        let config_path = fetch(CONFIG_FILE)?;
        let tokenizer_path = fetch(TOKENIZER_FILE)?;
        let weights_path = fetch(WEIGHTS_FILE)?;

        T5Summarizer::from_files(&config_path, &tokenizer_path, &weights_path, self.settings.clone())
    }
}

/// Abstractive summarizer backed by a T5 encoder-decoder running on the CPU
pub struct T5Summarizer {
    tokenizer: Tokenizer,
    // Decoding mutates the key/value cache, so calls take turns on the weights
    model: Mutex<t5::T5ForConditionalGeneration>,
    config: t5::Config,
    device: Device,
    settings: ModelConfig,
}

impl T5Summarizer {
    /// Build a summarizer from local checkpoint files
    pub fn from_files(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
        settings: ModelConfig,
    ) -> Result<Self> {
        let device = Device::Cpu;

        let mut config: t5::Config = serde_json::from_str(&std::fs::read_to_string(config_path)?)?;
        config.use_cache = true;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        // SAFETY: the weights file is not modified while mapped
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = t5::T5ForConditionalGeneration::load(vb, &config)?;

        Ok(Self {
            tokenizer,
            model: Mutex::new(model),
            config,
            device,
            settings,
        })
    }

    fn encode_input(&self, text: &str) -> Result<Vec<u32>> {
        let prompt = format!("{}{}", self.settings.prefix, text);
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        let ids = truncate_ids(
            encoding.get_ids(),
            self.settings.max_input_tokens,
            self.config.eos_token_id as u32,
        );
        if ids.len() < encoding.get_ids().len() {
            tracing::debug!(
                "Truncated model input from {} to {} tokens",
                encoding.get_ids().len(),
                ids.len()
            );
        }
        Ok(ids)
    }

    fn logits_processor(&self) -> LogitsProcessor {
        let temperature = (self.settings.temperature > 0.0).then_some(self.settings.temperature);
        let top_p = (self.settings.top_p > 0.0).then_some(self.settings.top_p);
        LogitsProcessor::new(self.settings.seed, temperature, top_p)
    }
}

impl SummaryModel for T5Summarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        let input_ids = self.encode_input(text)?;
        let input = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Other("summarization model lock poisoned".to_string()))?;
        model.clear_kv_cache();

        let encoder_output = model.encode(&input)?;

        let start_token = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut output_ids = vec![start_token];
        let mut logits_processor = self.logits_processor();

        for step in 0..self.settings.max_summary_tokens {
            let decoder_input = if step == 0 {
                Tensor::new(output_ids.as_slice(), &self.device)?.unsqueeze(0)?
            } else {
                let last = output_ids.last().copied().unwrap_or(start_token);
                Tensor::new(&[last], &self.device)?.unsqueeze(0)?
            };

            let logits = model.decode(&decoder_input, &encoder_output)?.squeeze(0)?;
            let logits = if self.settings.repeat_penalty == 1.0 {
                logits
            } else {
                candle_transformers::utils::apply_repeat_penalty(
                    &logits,
                    self.settings.repeat_penalty,
                    penalty_window(&output_ids, self.settings.repeat_last_n),
                )?
            };

            let next_id = logits_processor.sample(&logits)?;
            if next_id as usize == self.config.eos_token_id {
                break;
            }
            output_ids.push(next_id);
        }

        let summary = self
            .tokenizer
            .decode(&output_ids, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        tracing::debug!("Generated {} summary tokens", output_ids.len() - 1);

        Ok(summary.trim().to_string())
    }
}

/// Clip token ids to `max_len`, keeping the end-of-sequence marker last
fn truncate_ids(ids: &[u32], max_len: usize, eos_id: u32) -> Vec<u32> {
    if ids.len() <= max_len || max_len == 0 {
        return ids.to_vec();
    }
    let mut truncated = ids[..max_len - 1].to_vec();
    truncated.push(eos_id);
    truncated
}

/// Generated ids the repeat penalty applies to: the last `last_n`, never the decoder start token
fn penalty_window(output_ids: &[u32], last_n: usize) -> &[u32] {
    let start_at = output_ids.len().saturating_sub(last_n).max(1).min(output_ids.len());
    &output_ids[start_at..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_untouched() {
        assert_eq!(truncate_ids(&[5, 6, 1], 512, 1), vec![5, 6, 1]);
        assert_eq!(truncate_ids(&[5, 6, 1], 3, 1), vec![5, 6, 1]);
    }

    #[test]
    fn test_long_input_truncated_with_eos() {
        let ids: Vec<u32> = (10..30).collect();
        let truncated = truncate_ids(&ids, 8, 1);
        assert_eq!(truncated.len(), 8);
        assert_eq!(&truncated[..7], &ids[..7]);
        assert_eq!(truncated.last(), Some(&1));
    }

    #[test]
    fn test_zero_limit_disables_truncation() {
        assert_eq!(truncate_ids(&[3, 4, 1], 0, 1), vec![3, 4, 1]);
    }

    #[test]
    fn test_penalty_window_skips_start_token() {
        assert!(penalty_window(&[0], 64).is_empty());
        assert_eq!(penalty_window(&[0, 7, 8, 9], 64), &[7, 8, 9]);
        assert_eq!(penalty_window(&[0, 7, 8, 9], 2), &[8, 9]);
        assert!(penalty_window(&[0, 7], 0).is_empty());
        assert!(penalty_window(&[], 64).is_empty());
    }

    #[test]
    fn test_loader_reports_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let result = T5Summarizer::from_files(&missing, &missing, &missing, ModelConfig::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
