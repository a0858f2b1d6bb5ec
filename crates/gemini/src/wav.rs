//! Wrap raw linear PCM in a RIFF/WAVE container.
//!
//! Layout of the 44-byte header (all integers little-endian):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | `RIFF` |
//! | 4 | 4 | total size - 8 |
//! | 8 | 4 | `WAVE` |
//! | 12 | 4 | `fmt ` |
//! | 16 | 4 | fmt chunk size (16) |
//! | 20 | 2 | audio format (1 = PCM) |
//! | 22 | 2 | channels |
//! | 24 | 4 | sample rate |
//! | 28 | 4 | byte rate |
//! | 32 | 2 | block align |
//! | 34 | 2 | bits per sample |
//! | 36 | 4 | `data` |
//! | 40 | 4 | data size |

use bytes::{BufMut, Bytes, BytesMut};

/// Size of the canonical PCM WAVE header.
pub const WAV_HEADER_LEN: usize = 44;

const PCM_FORMAT: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// Sample layout of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// What the speech model emits: 24 kHz, mono, signed 16-bit.
    pub const SPEECH: Self = Self {
        sample_rate: 24_000,
        channels: 1,
        bits_per_sample: 16,
    };

    pub fn block_align(&self) -> u16 {
        self.channels * self.bits_per_sample / 8
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

/// Prefix `pcm` with a WAVE header describing `format`.
pub fn pcm_to_wav(pcm: &[u8], format: PcmFormat) -> Bytes {
    let data_len = pcm.len() as u32;
    let mut buf = BytesMut::with_capacity(WAV_HEADER_LEN + pcm.len());

    buf.put_slice(b"RIFF");
    buf.put_u32_le(data_len + (WAV_HEADER_LEN as u32 - 8));
    buf.put_slice(b"WAVE");

    buf.put_slice(b"fmt ");
    buf.put_u32_le(FMT_CHUNK_LEN);
    buf.put_u16_le(PCM_FORMAT);
    buf.put_u16_le(format.channels);
    buf.put_u32_le(format.sample_rate);
    buf.put_u32_le(format.byte_rate());
    buf.put_u16_le(format.block_align());
    buf.put_u16_le(format.bits_per_sample);

    buf.put_slice(b"data");
    buf.put_u32_le(data_len);
    buf.put_slice(pcm);

    buf.freeze()
}
