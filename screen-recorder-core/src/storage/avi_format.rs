/// AVI (RIFF) container layout for a single Motion-JPEG video stream.
///
/// The header is written with placeholder sizes when the stream opens and
/// patched in place when it closes, the same way a WAV header is.
///
/// Layout (byte offsets):
/// ```text
/// [0-11]     "RIFF" <file size - 8> "AVI "
/// [12-23]    "LIST" <192> "hdrl"
/// [24-87]      "avih" <56> MainAVIHeader
///                [32] µs per frame   [36] max bytes/sec   [44] flags
///                [48] total frames   [56] streams         [60] suggested buffer
///                [64] width          [68] height
/// [88-99]      "LIST" <116> "strl"
/// [100-163]      "strh" <56> AVIStreamHeader ("vids", "MJPG")
///                  [128] scale  [132] rate  [140] length  [144] suggested buffer
/// [164-211]      "strf" <40> BITMAPINFOHEADER
/// [212-223]  "LIST" <movi size> "movi"
/// [224-...]    "00dc" <len> <jpeg> [pad]  (one chunk per frame)
/// [...]      "idx1" <16 * frames> entries
/// ```
pub const AVI_HEADER_SIZE: usize = 224;

pub const RIFF_SIZE_OFFSET: u64 = 4;
pub const AVIH_MAX_BYTES_PER_SEC_OFFSET: u64 = 36;
pub const AVIH_TOTAL_FRAMES_OFFSET: u64 = 48;
pub const AVIH_SUGGESTED_BUFFER_OFFSET: u64 = 60;
pub const STRH_LENGTH_OFFSET: u64 = 140;
pub const STRH_SUGGESTED_BUFFER_OFFSET: u64 = 144;
pub const MOVI_SIZE_OFFSET: u64 = 216;

/// Size of a chunk header ("00dc" + length).
pub const CHUNK_HEADER_SIZE: usize = 8;
/// Size of one `idx1` entry.
pub const INDEX_ENTRY_SIZE: usize = 16;

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;
const FRAME_CHUNK_ID: &[u8; 4] = b"00dc";

struct HeaderCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl HeaderCursor<'_> {
    fn fourcc(&mut self, code: &[u8; 4]) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(code);
        self.pos += 4;
    }

    fn u32(&mut self, value: u32) {
        self.buf[self.pos..self.pos + 4].copy_from_slice(&value.to_le_bytes());
        self.pos += 4;
    }

    fn u16(&mut self, value: u16) {
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_le_bytes());
        self.pos += 2;
    }

    fn skip(&mut self, len: usize) {
        self.pos += len;
    }
}

/// Generate the 224-byte AVI header with zeroed frame counts and sizes.
pub fn generate_avi_header(width: u32, height: u32, frame_rate: u32) -> [u8; AVI_HEADER_SIZE] {
    let mut header = [0u8; AVI_HEADER_SIZE];
    let mut c = HeaderCursor {
        buf: &mut header,
        pos: 0,
    };

    c.fourcc(b"RIFF");
    c.u32((AVI_HEADER_SIZE - 8) as u32);
    c.fourcc(b"AVI ");

    c.fourcc(b"LIST");
    c.u32(192);
    c.fourcc(b"hdrl");

    // MainAVIHeader
    c.fourcc(b"avih");
    c.u32(56);
    c.u32(1_000_000 / frame_rate.max(1));
    c.u32(0); // max bytes per second, patched on close
    c.u32(0); // padding granularity
    c.u32(AVIF_HASINDEX);
    c.u32(0); // total frames, patched on close
    c.u32(0); // initial frames
    c.u32(1); // streams
    c.u32(0); // suggested buffer size, patched on close
    c.u32(width);
    c.u32(height);
    c.skip(16); // reserved

    c.fourcc(b"LIST");
    c.u32(116);
    c.fourcc(b"strl");

    // AVIStreamHeader
    c.fourcc(b"strh");
    c.u32(56);
    c.fourcc(b"vids");
    c.fourcc(b"MJPG");
    c.u32(0); // flags
    c.u16(0); // priority
    c.u16(0); // language
    c.u32(0); // initial frames
    c.u32(1); // scale
    c.u32(frame_rate);
    c.u32(0); // start
    c.u32(0); // length, patched on close
    c.u32(0); // suggested buffer size, patched on close
    c.u32(u32::MAX); // quality: driver default
    c.u32(0); // sample size
    c.u16(0);
    c.u16(0);
    c.u16(width.min(u16::MAX as u32) as u16);
    c.u16(height.min(u16::MAX as u32) as u16);

    // BITMAPINFOHEADER
    c.fourcc(b"strf");
    c.u32(40);
    c.u32(40);
    c.u32(width);
    c.u32(height);
    c.u16(1); // planes
    c.u16(24); // bit count
    c.fourcc(b"MJPG");
    c.u32(width.saturating_mul(height).saturating_mul(3));
    c.skip(16); // pels per meter, colors used, colors important

    c.fourcc(b"LIST");
    c.u32(4); // movi size, patched on close
    c.fourcc(b"movi");

    debug_assert_eq!(c.pos, AVI_HEADER_SIZE);
    header
}

/// Chunk header preceding one encoded frame inside `movi`.
pub fn frame_chunk_header(data_len: u32) -> [u8; CHUNK_HEADER_SIZE] {
    let mut header = [0u8; CHUNK_HEADER_SIZE];
    header[0..4].copy_from_slice(FRAME_CHUNK_ID);
    header[4..8].copy_from_slice(&data_len.to_le_bytes());
    header
}

/// RIFF chunks are word aligned; odd-sized payloads get one pad byte.
pub fn padded_len(data_len: u32) -> u32 {
    data_len + (data_len & 1)
}

/// One `idx1` entry. `offset` is relative to the "movi" fourcc.
pub fn index_entry(offset: u32, data_len: u32) -> [u8; INDEX_ENTRY_SIZE] {
    let mut entry = [0u8; INDEX_ENTRY_SIZE];
    entry[0..4].copy_from_slice(FRAME_CHUNK_ID);
    entry[4..8].copy_from_slice(&AVIIF_KEYFRAME.to_le_bytes());
    entry[8..12].copy_from_slice(&offset.to_le_bytes());
    entry[12..16].copy_from_slice(&data_len.to_le_bytes());
    entry
}

/// Header of the `idx1` chunk for `frames` entries.
pub fn index_chunk_header(frames: u32) -> [u8; CHUNK_HEADER_SIZE] {
    let mut header = [0u8; CHUNK_HEADER_SIZE];
    header[0..4].copy_from_slice(b"idx1");
    header[4..8].copy_from_slice(&(frames * INDEX_ENTRY_SIZE as u32).to_le_bytes());
    header
}

/// Read a little-endian u32 at `offset`.
pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}
