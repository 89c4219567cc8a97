// Microphone capture with periodic flush to the transport
//
// The device delivers float blocks from the real-time capture context
// through an unbounded channel. A flush task drains everything queued
// on each tick, concatenates in arrival order, encodes the lot as one
// frame, and forwards it to the registered sink. Audio that cannot be
// flushed after teardown is discarded, never reordered.

use base64::Engine;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::device::{AudioInput, CaptureError, MicInput};
use super::encoder;
use super::recorder::WavArchive;

/// One flushed unit of encoded audio: all samples captured since the
/// previous flush, base64 PCM16 little-endian.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Base64-encoded PCM16 LE bytes
    pub data: String,
    /// Number of samples in the frame
    pub sample_count: usize,
    /// Epoch milliseconds at flush time
    pub timestamp_ms: i64,
}

/// Configuration for microphone capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Samples per device block
    pub block_size: u32,
    /// Interval between flushes to the sink
    pub flush_interval: Duration,
    /// Optional WAV file mirroring everything flushed
    pub archive_path: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,                        // backend STT expects 24kHz
            block_size: 4096,                          // ~170ms per block at 24kHz
            flush_interval: Duration::from_millis(250),
            archive_path: None,
        }
    }
}

/// Bridges an audio input device into periodic encoded frames
pub struct CaptureManager {
    config: CaptureConfig,
    input: Box<dyn AudioInput>,
    frames: mpsc::Sender<AudioFrame>,
    capturing: bool,
    paused: bool,
    flush_task: Option<JoinHandle<()>>,
}

impl CaptureManager {
    pub fn new(
        config: CaptureConfig,
        input: Box<dyn AudioInput>,
        frames: mpsc::Sender<AudioFrame>,
    ) -> Self {
        Self {
            config,
            input,
            frames,
            capturing: false,
            paused: false,
            flush_task: None,
        }
    }

    /// Capture from the default microphone
    pub fn with_microphone(config: CaptureConfig, frames: mpsc::Sender<AudioFrame>) -> Self {
        let input = Box::new(MicInput::new(config.sample_rate, config.block_size));
        Self::new(config, input, frames)
    }

    /// Start capturing. No-op if already capturing.
    ///
    /// Fails with `CaptureError::DeviceUnavailable` when the device
    /// cannot be opened; internal state is untouched on failure, so the
    /// caller can retry after `stop()`.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if self.capturing {
            return Ok(());
        }

        let (block_tx, block_rx) = mpsc::unbounded_channel();
        self.input.open(block_tx).await?;

        let archive = self.config.archive_path.as_ref().and_then(|path| {
            match WavArchive::create(path, self.config.sample_rate) {
                Ok(a) => Some(a),
                Err(e) => {
                    warn!("capture archive disabled: {}", e);
                    None
                }
            }
        });

        let frames = self.frames.clone();
        let flush_interval = self.config.flush_interval;
        self.flush_task = Some(tokio::spawn(flush_loop(
            block_rx,
            frames,
            flush_interval,
            archive,
        )));

        self.capturing = true;
        self.paused = false;

        info!(
            "audio capture started ({} Hz, block {}, flush {:?}, input: {})",
            self.config.sample_rate,
            self.config.block_size,
            self.config.flush_interval,
            self.input.name()
        );

        Ok(())
    }

    /// Stop capturing and release the device.
    ///
    /// Safe to call from any state, any number of times. Cancels the
    /// flush task, closes the input, and discards pending audio.
    pub async fn stop(&mut self) {
        if let Some(task) = self.flush_task.take() {
            task.abort();
        }
        self.input.close();

        if self.capturing {
            info!("audio capture stopped");
        }
        self.capturing = false;
        self.paused = false;
    }

    /// Suspend the device stream without releasing it. No-op unless
    /// capturing and not already paused.
    pub fn pause(&mut self) {
        if self.capturing && !self.paused {
            self.input.pause();
            self.paused = true;
            debug!("audio capture paused");
        }
    }

    /// Resume a paused device stream. No-op unless paused.
    pub fn resume(&mut self) {
        if self.capturing && self.paused {
            self.input.resume();
            self.paused = false;
            debug!("audio capture resumed");
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Drains every queued block on each tick and emits one frame for the
/// concatenation. Ends when the frame receiver goes away.
async fn flush_loop(
    mut blocks: mpsc::UnboundedReceiver<Vec<f32>>,
    frames: mpsc::Sender<AudioFrame>,
    flush_interval: Duration,
    mut archive: Option<WavArchive>,
) {
    let mut interval = tokio::time::interval(flush_interval);

    loop {
        interval.tick().await;

        let mut pending: Vec<Vec<f32>> = Vec::new();
        while let Ok(block) = blocks.try_recv() {
            pending.push(block);
        }
        if pending.is_empty() {
            continue;
        }

        let total: usize = pending.iter().map(Vec::len).sum();
        let mut combined = Vec::with_capacity(total);
        for block in &pending {
            combined.extend_from_slice(block);
        }

        let pcm = encoder::pcm16_from_f32(&combined);

        if let Some(a) = archive.as_mut() {
            if let Err(e) = a.append(&pcm) {
                warn!("failed to append capture archive: {}", e);
            }
        }

        let data =
            base64::engine::general_purpose::STANDARD.encode(encoder::pcm16_to_le_bytes(&pcm));
        let frame = AudioFrame {
            data,
            sample_count: pcm.len(),
            timestamp_ms: Utc::now().timestamp_millis(),
        };

        if frames.send(frame).await.is_err() {
            debug!("frame receiver dropped, ending flush loop");
            break;
        }
    }
}
