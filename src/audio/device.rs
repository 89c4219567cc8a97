// Microphone input behind a trait so capture logic stays testable
//
// The real implementation owns its cpal stream on a dedicated thread:
// cpal streams are not Send, and the capture callback runs on the
// host's real-time audio thread. Sample blocks cross into the runtime
// through an unbounded channel only.

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use std::sync::mpsc as std_mpsc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Errors from the audio input layer
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Device access was denied, or no usable input device exists.
    /// Not fatal to a session; capture can be retried after `stop()`.
    #[error("audio input device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Sender for raw float sample blocks coming off the capture context
pub type BlockSender = mpsc::UnboundedSender<Vec<f32>>;

/// Audio input device abstraction
///
/// Implementations deliver fixed-rate mono f32 blocks to the sender
/// handed to `open`, in capture order, until closed.
#[async_trait]
pub trait AudioInput: Send {
    /// Open the device and begin delivering sample blocks.
    ///
    /// Opening an already-open device is a no-op.
    async fn open(&mut self, blocks: BlockSender) -> Result<(), CaptureError>;

    /// Suspend block delivery without releasing the device.
    fn pause(&mut self);

    /// Resume block delivery after a pause.
    fn resume(&mut self);

    /// Release the device and its underlying stream.
    fn close(&mut self);

    /// Input name for logging
    fn name(&self) -> &str;
}

enum DeviceCommand {
    Pause,
    Resume,
    Close,
}

/// Default microphone input via cpal
pub struct MicInput {
    sample_rate: u32,
    block_size: u32,
    ctrl: Option<std_mpsc::Sender<DeviceCommand>>,
}

impl MicInput {
    pub fn new(sample_rate: u32, block_size: u32) -> Self {
        Self {
            sample_rate,
            block_size,
            ctrl: None,
        }
    }
}

#[async_trait]
impl AudioInput for MicInput {
    async fn open(&mut self, blocks: BlockSender) -> Result<(), CaptureError> {
        if self.ctrl.is_some() {
            return Ok(());
        }

        let (ctrl_tx, ctrl_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let sample_rate = self.sample_rate;
        let block_size = self.block_size;

        std::thread::spawn(move || {
            run_device_thread(sample_rate, block_size, blocks, ctrl_rx, ready_tx);
        });

        match ready_rx.await {
            Ok(Ok(())) => {
                self.ctrl = Some(ctrl_tx);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CaptureError::Stream(
                "capture thread exited before the stream opened".to_string(),
            )),
        }
    }

    fn pause(&mut self) {
        if let Some(ctrl) = &self.ctrl {
            let _ = ctrl.send(DeviceCommand::Pause);
        }
    }

    fn resume(&mut self) {
        if let Some(ctrl) = &self.ctrl {
            let _ = ctrl.send(DeviceCommand::Resume);
        }
    }

    fn close(&mut self) {
        if let Some(ctrl) = self.ctrl.take() {
            let _ = ctrl.send(DeviceCommand::Close);
        }
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

/// Owns the cpal stream for its whole lifetime. Exits (releasing the
/// device) when told to close or when the controlling side is dropped.
fn run_device_thread(
    sample_rate: u32,
    block_size: u32,
    blocks: BlockSender,
    ctrl_rx: std_mpsc::Receiver<DeviceCommand>,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            let _ = ready_tx.send(Err(CaptureError::DeviceUnavailable(
                "no default input device".to_string(),
            )));
            return;
        }
    };

    info!(
        "capture device: {}",
        device.name().unwrap_or_else(|_| "unknown".to_string())
    );

    // Ask for the fixed block size first; fall back to the device
    // default when the host rejects it.
    let stream = match build_stream(&device, sample_rate, BufferSize::Fixed(block_size), &blocks) {
        Ok(s) => s,
        Err(_) => match build_stream(&device, sample_rate, BufferSize::Default, &blocks) {
            Ok(s) => s,
            Err(e) => {
                let _ = ready_tx.send(Err(CaptureError::DeviceUnavailable(e.to_string())));
                return;
            }
        },
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::Stream(e.to_string())));
        return;
    }

    let _ = ready_tx.send(Ok(()));

    while let Ok(cmd) = ctrl_rx.recv() {
        match cmd {
            DeviceCommand::Pause => {
                if let Err(e) = stream.pause() {
                    warn!("failed to pause capture stream: {}", e);
                }
            }
            DeviceCommand::Resume => {
                if let Err(e) = stream.play() {
                    warn!("failed to resume capture stream: {}", e);
                }
            }
            DeviceCommand::Close => break,
        }
    }
    // stream drops here, releasing the hardware
}

fn build_stream(
    device: &cpal::Device,
    sample_rate: u32,
    buffer_size: BufferSize,
    blocks: &BlockSender,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let config = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(sample_rate),
        buffer_size,
    };
    let blocks = blocks.clone();

    device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Real-time context: hand off and return immediately
            let _ = blocks.send(data.to_vec());
        },
        |err| error!("audio input stream error: {}", err),
        None,
    )
}
