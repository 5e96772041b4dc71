//! Audio output - runs the tone bank inside a cpal stream

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::{Consumer, RingBuffer};

use piano_kit::tone::{self, ToneHandle};

/// Queue depth for tone triggers (UI → audio)
const TONE_QUEUE_SIZE: usize = 256;
/// Scope tap capacity (audio → UI)
const SCOPE_QUEUE_SIZE: usize = 8192;

/// The UI's view of a running output stream
pub struct AudioView {
    /// Keeps the stream alive
    _stream: cpal::Stream,
    /// Rendered samples for the scope
    pub scope_rx: Consumer<f32>,
    pub sample_rate: f32,
}

/// Open the default output device and start rendering tones.
///
/// Returns the handle that triggers tones and the view the UI draws from.
pub fn start(voices: usize, volume: f32) -> EyreResult<(ToneHandle, AudioView)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available (try --mute)"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    log::info!(
        "audio: {} Hz, {} channels, {} voices",
        sample_rate,
        channels,
        voices
    );

    let (mut handle, mut bank) = tone::synth(sample_rate, voices, TONE_QUEUE_SIZE);
    handle.set_volume(volume);

    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
    let mut render_buf = vec![0.0f32; piano_kit::MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(piano_kit::MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames];
                bank.render_block(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    // Scope is best-effort; drop samples when the UI lags
                    let _ = scope_tx.push(s);
                }

                frames_written += frames;
            }
        },
        |err| log::error!("audio stream error: {}", err),
        None,
    )?;

    stream.play()?;

    Ok((
        handle,
        AudioView {
            _stream: stream,
            scope_rx,
            sample_rate,
        },
    ))
}
