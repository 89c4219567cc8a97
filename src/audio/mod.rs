pub mod capture;
pub mod device;
pub mod encoder;
pub mod recorder;

pub use capture::{AudioFrame, CaptureConfig, CaptureManager};
pub use device::{AudioInput, BlockSender, CaptureError, MicInput};
pub use recorder::WavArchive;
