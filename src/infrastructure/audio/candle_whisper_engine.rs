use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::audio_decoder::decode_file_to_pcm;

const MAX_SEGMENT_TOKENS: usize = 224;

/// Language tokens understood by multilingual Whisper checkpoints.
const LANGUAGE_CODES: &[&str] = &[
    "en", "zh", "de", "es", "ru", "ko", "fr", "ja", "pt", "tr", "pl", "ca", "nl", "ar", "sv",
    "it", "id", "hi", "fi", "vi", "he", "uk", "el", "ms", "cs", "ro", "da", "hu", "ta", "no",
    "th", "ur", "hr", "bg", "lt", "la", "mi", "ml", "cy", "sk", "te", "fa", "lv", "bn", "sr",
    "az", "sl", "kn", "et", "mk", "br", "eu", "is", "hy", "ne", "mn", "bs", "kk", "sq", "sw",
    "gl", "mr", "pa", "si", "km", "sn", "yo", "so", "af", "oc", "ka", "be", "tg", "sd", "gu",
    "am", "yi", "lo", "uz", "fo", "ht", "ps", "tk", "nn", "mt", "sa", "lb", "my", "bo", "tl",
    "mg", "as", "tt", "haw", "ln", "ha", "ba", "jw", "su",
];

/// Whisper checkpoint loaded from the Hugging Face hub and run with candle on CPU.
pub struct CandleWhisperEngine {
    inner: Arc<WhisperModel>,
}

struct WhisperModel {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
}

impl CandleWhisperEngine {
    /// Downloads (or reuses the hub cache for) `model_id` and loads it. Blocking.
    pub fn new(model_id: &str) -> Result<Self, TranscriptionError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model = model_id,
            "Initializing Candle Whisper transcription engine"
        );

        let api = Api::new().map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo.get("model.safetensors").map_err(|e| {
            TranscriptionError::ModelLoadFailed(format!("model.safetensors: {}", e))
        })?;

        let mel_repo = api.repo(Repo::new(
            "FL33TW00D-HF/whisper-base".to_string(),
            RepoType::Model,
        ));
        let mel_bytes_path = mel_repo
            .get("melfilters.bytes")
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("melfilters.bytes: {}", e)))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("mel filters: {}", e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| TranscriptionError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| TranscriptionError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(model = model_id, "Candle Whisper engine loaded successfully");

        Ok(Self {
            inner: Arc::new(WhisperModel {
                model: Mutex::new(model),
                tokenizer,
                config,
                device,
                mel_filters,
            }),
        })
    }

    async fn run_blocking<T, F>(&self, audio_path: &Path, job: F) -> Result<T, TranscriptionError>
    where
        T: Send + 'static,
        F: FnOnce(&WhisperModel, &[f32]) -> Result<T, TranscriptionError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let path: PathBuf = audio_path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let pcm = decode_file_to_pcm(&path)?;
            job(inner.as_ref(), pcm.as_slice())
        })
        .await
        .map_err(|e| TranscriptionError::TranscriptionFailed(format!("inference task: {}", e)))?
    }
}

#[async_trait]
impl TranscriptionEngine for CandleWhisperEngine {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.run_blocking(audio_path, |whisper, pcm| whisper.transcribe(pcm))
            .await
    }

    async fn detect_language(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        self.run_blocking(audio_path, |whisper, pcm| whisper.detect_language(pcm))
            .await
    }
}

impl WhisperModel {
    fn lock_model(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, m::model::Whisper>, TranscriptionError> {
        self.model
            .lock()
            .map_err(|_| TranscriptionError::TranscriptionFailed("model lock poisoned".into()))
    }

    fn mel_segments(&self, pcm: &[f32]) -> Result<Vec<Tensor>, TranscriptionError> {
        let chunk_samples = m::N_SAMPLES;
        let mut mel_tensors = Vec::new();

        for chunk in pcm.chunks(chunk_samples) {
            let samples = if chunk.len() < chunk_samples {
                let mut padded = chunk.to_vec();
                padded.resize(chunk_samples, 0.0);
                padded
            } else {
                chunk.to_vec()
            };

            let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
            let n_mel = self.config.num_mel_bins;
            let n_frames = mel_data.len() / n_mel;

            let mel_tensor = Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
                .map_err(|e| {
                    TranscriptionError::TranscriptionFailed(format!("mel tensor: {}", e))
                })?;

            mel_tensors.push(mel_tensor);
        }

        Ok(mel_tensors)
    }

    fn transcribe(&self, pcm: &[f32]) -> Result<String, TranscriptionError> {
        let mel_tensors = self.mel_segments(pcm)?;
        let prompt = [
            token_id(&self.tokenizer, m::SOT_TOKEN)?,
            token_id(&self.tokenizer, m::TRANSCRIBE_TOKEN)?,
            token_id(&self.tokenizer, m::NO_TIMESTAMPS_TOKEN)?,
        ];
        let eot_token = token_id(&self.tokenizer, m::EOT_TOKEN)?;

        let mut model = self.lock_model()?;
        let mut segments: Vec<String> = Vec::new();

        for (i, mel) in mel_tensors.iter().enumerate() {
            tracing::debug!(segment = i, "Transcribing audio segment");
            let tokens = self
                .greedy_decode(&mut model, mel, &prompt, eot_token)
                .map_err(|e| TranscriptionError::TranscriptionFailed(format!("segment {}: {}", i, e)))?;
            let text = self.detokenize(&tokens[prompt.len()..]);
            if !text.is_empty() {
                segments.push(text);
            }
        }

        let transcript = segments.join(" ");

        tracing::info!(
            segments = segments.len(),
            chars = transcript.len(),
            "Audio transcription completed"
        );

        Ok(transcript)
    }

    /// Scores every language token after `<|startoftranscript|>` on the first
    /// 30 seconds of audio. English-only checkpoints report `en`.
    fn detect_language(&self, pcm: &[f32]) -> Result<String, TranscriptionError> {
        let failed = |e: candle_core::Error| {
            TranscriptionError::LanguageDetectionFailed(e.to_string())
        };

        let candidates: Vec<(&str, u32)> = LANGUAGE_CODES
            .iter()
            .filter_map(|code| {
                self.tokenizer
                    .token_to_id(&format!("<|{}|>", code))
                    .map(|id| (*code, id))
            })
            .collect();
        if candidates.is_empty() {
            return Ok("en".to_string());
        }

        let mel = self
            .mel_segments(pcm)?
            .into_iter()
            .next()
            .ok_or_else(|| TranscriptionError::LanguageDetectionFailed("no audio".into()))?;
        let sot_token = token_id(&self.tokenizer, m::SOT_TOKEN)?;

        let mut model = self.lock_model()?;
        let logits = model
            .encoder
            .forward(&mel, true)
            .and_then(|features| self.last_logits(&mut model, &features, &[sot_token], true));
        model.reset_kv_cache();
        drop(model);
        let logits = logits.map_err(failed)?;

        let ids: Vec<u32> = candidates.iter().map(|(_, id)| *id).collect();
        let index = Tensor::new(ids.as_slice(), &self.device).map_err(failed)?;
        let best = logits
            .index_select(&index, 0)
            .and_then(|t| t.argmax(0))
            .and_then(|t| t.to_scalar::<u32>())
            .map_err(failed)? as usize;

        let code = candidates
            .get(best)
            .map(|(code, _)| code.to_string())
            .ok_or_else(|| TranscriptionError::LanguageDetectionFailed("no language".into()))?;

        tracing::debug!(language = %code, "Language detected");
        Ok(code)
    }

    /// Argmax decoding of one 30 second window until `eot_token` or the
    /// decoder's token budget. Returns the prompt followed by the output.
    fn greedy_decode(
        &self,
        model: &mut m::model::Whisper,
        mel: &Tensor,
        prompt: &[u32],
        eot_token: u32,
    ) -> candle_core::Result<Vec<u32>> {
        let features = model.encoder.forward(mel, true)?;
        let mut tokens = prompt.to_vec();

        let result = (|| -> candle_core::Result<()> {
            for _ in 0..MAX_SEGMENT_TOKENS {
                let flush = tokens.len() == prompt.len();
                let next = self
                    .last_logits(model, &features, &tokens, flush)?
                    .argmax(0)?
                    .to_scalar::<u32>()?;
                if next == eot_token {
                    break;
                }
                tokens.push(next);
            }
            Ok(())
        })();

        model.reset_kv_cache();
        result.map(|()| tokens)
    }

    /// Logits over the vocabulary for the position after `tokens`.
    fn last_logits(
        &self,
        model: &mut m::model::Whisper,
        features: &Tensor,
        tokens: &[u32],
        flush: bool,
    ) -> candle_core::Result<Tensor> {
        let input = Tensor::new(tokens, &self.device)?.unsqueeze(0)?;
        let hidden = model.decoder.forward(&input, features, flush)?;
        let logits = model.decoder.final_linear(&hidden.squeeze(0)?)?;
        let last = logits.dim(0)? - 1;
        logits.get(last)
    }

    fn detokenize(&self, tokens: &[u32]) -> String {
        tokens
            .iter()
            .filter_map(|id| self.tokenizer.id_to_token(*id))
            .map(|piece| piece.replace('Ġ', " ").replace('▁', " "))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, TranscriptionError> {
    tokenizer.token_to_id(token).ok_or_else(|| {
        TranscriptionError::TranscriptionFailed(format!("token not found: {}", token))
    })
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, TranscriptionError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(TranscriptionError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    let filters: Vec<f32> = bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(filters)
}
