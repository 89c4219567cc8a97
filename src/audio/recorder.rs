use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Local WAV archive of captured audio
///
/// Optional sidecar for a live session: everything the capture manager
/// flushes to the transport is also appended here, so a meeting can be
/// replayed or re-transcribed offline.
pub struct WavArchive {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    samples_written: usize,
}

impl WavArchive {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create archive directory")?;
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV archive: {:?}", path))?;

        info!("capture archive: {:?} ({} Hz)", path, sample_rate);

        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
            samples_written: 0,
        })
    }

    pub fn append(&mut self, samples: &[i16]) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV archive")?;
            }
            self.samples_written += samples.len();
        }
        Ok(())
    }

    pub fn samples_written(&self) -> usize {
        self.samples_written
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV archive")?;
        }
        Ok(self.path.clone())
    }
}

impl Drop for WavArchive {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV archive on drop: {}", e);
            }
        }
    }
}
