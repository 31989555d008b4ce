use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;
use crate::models::frame::{Frame, PixelLayout};
use crate::models::recording_result::StreamSummary;
use crate::storage::avi_format;
use crate::traits::video_encoder::{EncoderSettings, VideoEncoder, VideoStream};

/// Motion-JPEG in AVI: every frame is an independent JPEG keyframe at the
/// quality given in the stream's settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MjpegAviEncoder;

impl VideoEncoder for MjpegAviEncoder {
    type Stream = MjpegAviWriter;

    fn pixel_layout(&self) -> PixelLayout {
        PixelLayout::Rgb8
    }

    fn open(&self, settings: &EncoderSettings) -> Result<MjpegAviWriter, RecorderError> {
        MjpegAviWriter::create(settings.clone())
    }
}

/// Destination the writer streams into.
///
/// Besides `Write + Seek` it must be able to cut itself back to a given
/// length, which is how a chunk torn by a failed write is discarded.
pub trait OutputFile: Write + Seek + Send {
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Push written data to durable storage.
    fn sync(&mut self) -> io::Result<()>;
}

impl OutputFile for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Streaming MJPEG AVI file writer.
///
/// ## File Format
///
/// ```text
/// [224-byte AVI header, sizes patched on close]
/// [Chunk 1: "00dc" | 4-byte LE length | JPEG | pad to even]
/// [Chunk 2: ...]
/// ...
/// ["idx1" | 16 bytes per frame]
/// ```
///
/// Each chunk is flushed as a unit. The file on disk always ends on a
/// chunk boundary: when a chunk fails to write, whatever part of it
/// reached the file is truncated away and the stream can still be closed
/// into a valid AVI.
///
/// RIFF sizes are 32-bit, so a single file tops out just under 4 GiB;
/// frames that would cross the limit fail with `EncodeFailure`.
pub struct MjpegAviWriter<F: OutputFile = File> {
    settings: EncoderSettings,
    quality: u8,
    file: Option<BufWriter<F>>,
    index: Vec<[u8; avi_format::INDEX_ENTRY_SIZE]>,
    movi_data_len: u64,
    /// Bytes in the file, counting only complete chunks.
    total_bytes_written: u64,
    max_chunk_len: u32,
    jpeg_buffer: Vec<u8>,
    summary: Option<StreamSummary>,
}

impl MjpegAviWriter<File> {
    /// Create the file (and its parent directories) and write the
    /// placeholder header.
    pub fn create(settings: EncoderSettings) -> Result<Self, RecorderError> {
        check_settings(&settings)?;

        if let Some(parent) = settings.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| RecorderError::OutputUnwritable(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&settings.path)
            .map_err(|e| RecorderError::OutputUnwritable(format!("failed to create {}: {}", settings.path.display(), e)))?;

        Self::from_file(settings, file)
    }
}

impl<F: OutputFile> MjpegAviWriter<F> {
    /// Start a stream in an already-open, empty file at `settings.path`.
    pub fn from_file(settings: EncoderSettings, file: F) -> Result<Self, RecorderError> {
        check_settings(&settings)?;
        let header = avi_format::generate_avi_header(settings.width, settings.height, settings.frame_rate);

        let mut writer = Self {
            quality: settings.quality.clamp(1, 100),
            settings,
            file: Some(BufWriter::new(file)),
            index: Vec::new(),
            movi_data_len: 0,
            total_bytes_written: 0,
            max_chunk_len: 0,
            jpeg_buffer: Vec::new(),
            summary: None,
        };
        if let Err(e) = writer.write_raw(&header).and_then(|()| writer.flush()) {
            // Nothing worth finalizing; keep Drop from patching a torn header.
            writer.file = None;
            return Err(RecorderError::OutputUnwritable(format!("failed to write header: {}", e)));
        }

        log::debug!(
            "Opened MJPEG stream {} ({}x{} @ {} fps, quality {})",
            writer.settings.path.display(),
            writer.settings.width,
            writer.settings.height,
            writer.settings.frame_rate,
            writer.quality
        );
        Ok(writer)
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn append_chunk(&mut self, data: &[u8]) -> Result<(), RecorderError> {
        let data_len = u32::try_from(data.len())
            .map_err(|_| RecorderError::EncodeFailure("encoded frame exceeds 4 GiB".into()))?;
        let padded = avi_format::padded_len(data_len) as u64;

        // Everything still to come: this chunk, its index entry and the
        // index chunk header.
        let projected = self.total_bytes_written
            + avi_format::CHUNK_HEADER_SIZE as u64
            + padded
            + ((self.index.len() + 1) * avi_format::INDEX_ENTRY_SIZE) as u64
            + avi_format::CHUNK_HEADER_SIZE as u64;
        if projected > u32::MAX as u64 {
            return Err(RecorderError::EncodeFailure("AVI file size limit reached".into()));
        }

        // Offsets in idx1 are relative to the "movi" fourcc, which sits
        // four bytes before the first chunk.
        let offset = (4 + self.movi_data_len) as u32;
        let committed = self.total_bytes_written;

        if let Err(e) = self.write_chunk(data_len, data) {
            if let Err(rollback) = self.rollback(committed) {
                log::error!(
                    "Failed to discard torn chunk in {}: {}",
                    self.settings.path.display(),
                    rollback
                );
            }
            return Err(RecorderError::EncodeFailure(format!("write failed: {}", e)));
        }

        self.index.push(avi_format::index_entry(offset, data_len));
        self.movi_data_len += avi_format::CHUNK_HEADER_SIZE as u64 + padded;
        self.max_chunk_len = self.max_chunk_len.max(data_len);
        Ok(())
    }

    fn write_chunk(&mut self, data_len: u32, data: &[u8]) -> io::Result<()> {
        self.write_raw(&avi_format::frame_chunk_header(data_len))?;
        self.write_raw(data)?;
        if data_len & 1 == 1 {
            self.write_raw(&[0])?;
        }
        self.flush()
    }

    /// Cut the file back to `committed` bytes, dropping anything still
    /// buffered. On failure the file is abandoned and the stream reports
    /// itself closed.
    fn rollback(&mut self, committed: u64) -> io::Result<()> {
        let writer = self.file.take().ok_or_else(not_open)?;
        let (mut file, _unflushed) = writer.into_parts();
        file.truncate(committed)?;
        file.seek(SeekFrom::Start(committed))?;

        self.file = Some(BufWriter::new(file));
        self.total_bytes_written = committed;
        Ok(())
    }

    fn finalize(&mut self) -> io::Result<()> {
        let frames = self.index.len() as u32;

        let index_header = avi_format::index_chunk_header(frames);
        self.write_raw(&index_header)?;
        let entries = self.index.concat();
        self.write_raw(&entries)?;

        let riff_size = (self.total_bytes_written - 8) as u32;
        let movi_size = (4 + self.movi_data_len) as u32;
        let suggested_buffer = self.max_chunk_len + avi_format::CHUNK_HEADER_SIZE as u32;
        let max_bytes_per_sec = suggested_buffer.saturating_mul(self.settings.frame_rate);

        let file = self.file.as_mut().ok_or_else(not_open)?;

        for (offset, value) in [
            (avi_format::RIFF_SIZE_OFFSET, riff_size),
            (avi_format::AVIH_MAX_BYTES_PER_SEC_OFFSET, max_bytes_per_sec),
            (avi_format::AVIH_TOTAL_FRAMES_OFFSET, frames),
            (avi_format::AVIH_SUGGESTED_BUFFER_OFFSET, suggested_buffer),
            (avi_format::STRH_LENGTH_OFFSET, frames),
            (avi_format::STRH_SUGGESTED_BUFFER_OFFSET, suggested_buffer),
            (avi_format::MOVI_SIZE_OFFSET, movi_size),
        ] {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&value.to_le_bytes())?;
        }

        file.flush()?;
        file.get_mut().sync()?;
        Ok(())
    }

    fn write_raw(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(not_open)?;
        file.write_all(data)?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().ok_or_else(not_open)?.flush()
    }
}

impl<F: OutputFile> VideoStream for MjpegAviWriter<F> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), RecorderError> {
        if self.file.is_none() {
            return Err(RecorderError::EncodeFailure("stream is closed".into()));
        }
        if frame.layout() != PixelLayout::Rgb8 {
            return Err(RecorderError::EncodeFailure(format!(
                "expected Rgb8 frame, got {:?}",
                frame.layout()
            )));
        }
        if frame.width() != self.settings.width || frame.height() != self.settings.height {
            return Err(RecorderError::EncodeFailure(format!(
                "frame is {}x{}, stream expects {}x{}",
                frame.width(),
                frame.height(),
                self.settings.width,
                self.settings.height
            )));
        }

        let mut jpeg = std::mem::take(&mut self.jpeg_buffer);
        jpeg.clear();
        let encoded = JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode(frame.data(), frame.width(), frame.height(), ExtendedColorType::Rgb8)
            .map_err(|e| RecorderError::EncodeFailure(format!("jpeg encoding failed: {}", e)));

        let result = encoded.and_then(|()| self.append_chunk(&jpeg));
        self.jpeg_buffer = jpeg;
        result
    }

    fn frames_written(&self) -> u64 {
        self.index.len() as u64
    }

    fn close(&mut self) -> Result<StreamSummary, RecorderError> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }
        if self.file.is_none() {
            return Err(RecorderError::EncodeFailure("stream was not finalized".into()));
        }

        let finalized = self.finalize();
        // The handle is released whether or not finalization succeeded.
        self.file = None;
        finalized.map_err(|e| RecorderError::EncodeFailure(format!("failed to finalize: {}", e)))?;

        let checksum = sha256_file(&self.settings.path)?;
        let summary = StreamSummary {
            frames_written: self.index.len() as u64,
            bytes_written: self.total_bytes_written,
            checksum,
        };
        log::debug!(
            "Closed MJPEG stream {} ({} frames, {} bytes)",
            self.settings.path.display(),
            summary.frames_written,
            summary.bytes_written
        );
        self.summary = Some(summary.clone());
        Ok(summary)
    }
}

impl<F: OutputFile> Drop for MjpegAviWriter<F> {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                log::warn!("Failed to finalize {} on drop: {}", self.settings.path.display(), e);
            }
        }
    }
}

fn check_settings(settings: &EncoderSettings) -> Result<(), RecorderError> {
    if settings.width == 0 || settings.height == 0 {
        return Err(RecorderError::OutputUnwritable(format!(
            "cannot open a {}x{} video stream",
            settings.width, settings.height
        )));
    }
    if settings.frame_rate == 0 {
        return Err(RecorderError::OutputUnwritable("frame rate must be positive".into()));
    }
    Ok(())
}

fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "file is not open")
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, RecorderError> {
    let mut file = File::open(path)
        .map_err(|e| RecorderError::EncodeFailure(format!("failed to read file for checksum: {}", e)))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| RecorderError::EncodeFailure(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
