use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioProbeError, TranscriptionError};

const TARGET_SAMPLE_RATE: u32 = 16_000;

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, String> {
    let file = File::open(path).map_err(|e| format!("open: {}", e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| format!("probe: {}", e))?;

    Ok(probed.format)
}

/// Next packet belonging to `track_id`, or `None` at end of stream.
fn next_track_packet(
    format: &mut dyn FormatReader,
    track_id: u32,
) -> Result<Option<Packet>, SymphoniaError> {
    loop {
        match format.next_packet() {
            Ok(packet) if packet.track_id() == track_id => return Ok(Some(packet)),
            Ok(_) => {}
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Duration of the default track in seconds.
///
/// Uses the container's frame count when it declares one, otherwise sums
/// packet durations.
pub fn probe_duration(path: &Path) -> Result<f64, AudioProbeError> {
    let mut format = open_format(path).map_err(AudioProbeError::Unreadable)?;

    let track = format
        .default_track()
        .ok_or_else(|| AudioProbeError::Unreadable("no audio track found".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
        if rate > 0 {
            return Ok(frames as f64 / rate as f64);
        }
    }

    let time_base = params.time_base.ok_or_else(|| {
        AudioProbeError::DurationUnavailable("no frame count or time base".to_string())
    })?;

    let mut total_ts: u64 = 0;
    while let Some(packet) = next_track_packet(format.as_mut(), track_id)
        .map_err(|e| AudioProbeError::DurationUnavailable(e.to_string()))?
    {
        total_ts += packet.dur();
    }

    let time = time_base.calc_time(total_ts);
    Ok(time.seconds as f64 + time.frac)
}

/// Decodes an audio file to 16 kHz mono PCM.
pub fn decode_file_to_pcm(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let failed = TranscriptionError::DecodingFailed;
    let mut format = open_format(path).map_err(failed)?;

    let track = format
        .default_track()
        .ok_or_else(|| failed("no audio track found".to_string()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let source_rate = params
        .sample_rate
        .ok_or_else(|| failed("unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| failed(format!("codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    while let Some(packet) =
        next_track_packet(format.as_mut(), track_id).map_err(|e| failed(format!("packet: {}", e)))?
    {
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(failed(format!("decode: {}", e))),
        };
        if decoded.frames() == 0 {
            continue;
        }

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let frames = decoded.capacity();
        if buffer
            .as_ref()
            .map_or(true, |buf| buf.capacity() < frames * channels)
        {
            buffer = Some(SampleBuffer::new(frames as u64, spec));
        }
        if let Some(buf) = buffer.as_mut() {
            buf.copy_interleaved_ref(decoded);
            downmix_into(buf.samples(), channels, &mut mono);
        }
    }

    if mono.is_empty() {
        return Err(failed("no audio samples decoded".to_string()));
    }

    let pcm = if source_rate == TARGET_SAMPLE_RATE {
        mono
    } else {
        resample(&mono, source_rate, TARGET_SAMPLE_RATE)?
    };

    tracing::debug!(
        samples = pcm.len(),
        duration_secs = pcm.len() as f32 / TARGET_SAMPLE_RATE as f32,
        source_rate,
        "Audio decoded to 16kHz mono PCM"
    );

    Ok(pcm)
}

fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    let scale = 1.0 / channels as f32;
    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}

/// Sinc resampling in fixed chunks. The tail is zero padded to a whole chunk
/// and the output trimmed back to the nominal length.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, TranscriptionError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    const CHUNK: usize = 1024;

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK, 1)
        .map_err(|e| TranscriptionError::DecodingFailed(format!("resampler init: {}", e)))?;

    let mut input = samples.to_vec();
    input.resize(samples.len().div_ceil(CHUNK) * CHUNK, 0.0);

    let nominal_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(nominal_len + CHUNK);
    for chunk in input.chunks_exact(CHUNK) {
        let frames = resampler
            .process(&[chunk], None)
            .map_err(|e| TranscriptionError::DecodingFailed(format!("resample: {}", e)))?;
        if let Some(channel) = frames.first() {
            output.extend_from_slice(channel);
        }
    }
    output.truncate(nominal_len);

    Ok(output)
}
