pub mod audio_decoder;
mod candle_whisper_engine;
mod model_loaders;
mod openai_whisper_engine;
mod symphonia_probe;

pub use candle_whisper_engine::CandleWhisperEngine;
pub use model_loaders::{CandleWhisperLoader, ModelLoaderFactory, OpenAiWhisperLoader};
pub use openai_whisper_engine::OpenAiWhisperEngine;
pub use symphonia_probe::SymphoniaProbe;
