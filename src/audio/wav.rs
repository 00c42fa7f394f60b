// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! RIFF/WAVE PCM encoding and decoding.
//!
//! The encoder always writes the 44 byte canonical header. The decoder walks the
//! sub-chunks by tag so files with extra chunks (LIST, fact, ...) still load.

use super::error::WavError;
use super::pcm::{PcmBuffer, PCM16_SCALE};

/// Size of the canonical header written by the encoder.
pub const HEADER_LEN: usize = 44;

/// Format code for integer PCM.
const PCM_FORMAT: u16 = 1;

/// Size of the PCM fmt chunk body.
const FMT_CHUNK_LEN: u32 = 16;

/// Format information from a WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample on disk.
    pub bits_per_sample: u16,
}

impl WavSpec {
    /// Bytes per frame.
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * (self.bits_per_sample as u32 / 8)
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }
}

/// The decoded contents of a WAV file, normalized to floats.
#[derive(Debug, Clone)]
pub struct DecodedWav {
    spec: WavSpec,
    samples: Vec<f32>,
}

impl DecodedWav {
    /// Returns the format of the source file.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Returns the interleaved samples in [-1.0, 1.0).
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consumes the decoded file and returns its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Converts the normalized samples back to 16-bit PCM. This is exact for
    /// files that were 16-bit on disk.
    pub fn to_pcm16(&self) -> PcmBuffer {
        let samples = self
            .samples
            .iter()
            .map(|&sample| {
                (sample * PCM16_SCALE)
                    .round()
                    .clamp(i16::MIN as f32, i16::MAX as f32) as i16
            })
            .collect();
        PcmBuffer::new(samples, self.spec.sample_rate, self.spec.channels)
    }
}

/// Encodes a PCM buffer as a 16-bit WAV file.
pub fn encode(buffer: &PcmBuffer) -> Result<Vec<u8>, WavError> {
    encode_samples(
        buffer.samples(),
        buffer.sample_rate(),
        buffer.channels(),
        16,
    )
}

/// Encodes interleaved 16-bit samples as a WAV file with the given bit depth.
/// 8-bit output is unsigned with a 128 offset, as the format requires.
pub fn encode_samples(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Result<Vec<u8>, WavError> {
    if channels == 0 {
        return Err(WavError::EncodeOverflow(
            "channel count must be at least 1".to_string(),
        ));
    }

    let bytes_per_sample: u32 = match bits_per_sample {
        8 => 1,
        16 => 2,
        other => {
            return Err(WavError::EncodeOverflow(format!(
                "unsupported bit depth {}",
                other
            )))
        }
    };

    let data_len = u32::try_from(samples.len())
        .ok()
        .and_then(|count| count.checked_mul(bytes_per_sample))
        .ok_or_else(|| {
            WavError::EncodeOverflow(format!(
                "{} samples do not fit in a data chunk",
                samples.len()
            ))
        })?;
    let riff_len = data_len.checked_add(36).ok_or_else(|| {
        WavError::EncodeOverflow(format!("data chunk of {} bytes is too large", data_len))
    })?;
    let block_align = u16::try_from(channels as u32 * bytes_per_sample).map_err(|_| {
        WavError::EncodeOverflow(format!("block align overflows for {} channels", channels))
    })?;
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| {
            WavError::EncodeOverflow(format!("byte rate overflows at {}Hz", sample_rate))
        })?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    if bits_per_sample == 8 {
        out.extend(samples.iter().map(|&sample| ((sample >> 8) + 128) as u8));
    } else {
        for sample in samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }

    Ok(out)
}

/// Decodes a WAV file held in memory.
pub fn decode(bytes: &[u8]) -> Result<DecodedWav, WavError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(WavError::Format("missing RIFF/WAVE header".to_string()));
    }

    let mut spec: Option<WavSpec> = None;
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let tag = &bytes[pos..pos + 4];
        let declared = read_u32(bytes, pos + 4);
        let body = pos + 8;
        let available = bytes.len() - body;

        match tag {
            b"fmt " => {
                if declared < FMT_CHUNK_LEN {
                    return Err(WavError::Format(format!(
                        "fmt chunk is {} bytes, expected at least {}",
                        declared, FMT_CHUNK_LEN
                    )));
                }
                if declared as usize > available {
                    return Err(WavError::Malformed {
                        declared,
                        available,
                    });
                }
                spec = Some(parse_fmt(&bytes[body..body + FMT_CHUNK_LEN as usize])?);
            }
            b"data" => {
                let spec = spec
                    .ok_or_else(|| WavError::Format("data chunk before fmt chunk".to_string()))?;
                if declared as usize > available {
                    return Err(WavError::Malformed {
                        declared,
                        available,
                    });
                }
                let samples = decode_samples(spec, &bytes[body..body + declared as usize]);
                return Ok(DecodedWav { spec, samples });
            }
            _ => {}
        }

        // Chunks are padded to an even length.
        let padded = declared as usize + (declared as usize & 1);
        pos = body.saturating_add(padded);
    }

    match spec {
        Some(_) => Err(WavError::Format("missing data chunk".to_string())),
        None => Err(WavError::Format("missing fmt chunk".to_string())),
    }
}

fn read_u16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

fn read_u32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

fn parse_fmt(fmt: &[u8]) -> Result<WavSpec, WavError> {
    let format = read_u16(fmt, 0);
    if format != PCM_FORMAT {
        return Err(WavError::Format(format!(
            "unsupported format code {}, only PCM is supported",
            format
        )));
    }

    let spec = WavSpec {
        channels: read_u16(fmt, 2),
        sample_rate: read_u32(fmt, 4),
        bits_per_sample: read_u16(fmt, 14),
    };

    if spec.channels == 0 {
        return Err(WavError::Format("channel count is 0".to_string()));
    }
    if spec.sample_rate == 0 {
        return Err(WavError::Format("sample rate is 0".to_string()));
    }
    match spec.bits_per_sample {
        8 | 16 | 24 | 32 => Ok(spec),
        other => Err(WavError::Format(format!("unsupported bit depth {}", other))),
    }
}

fn decode_samples(spec: WavSpec, data: &[u8]) -> Vec<f32> {
    let bytes_per_sample = spec.bits_per_sample as usize / 8;
    // Scale integer samples of any depth into the same range as 16-bit / 32768.
    let scale_factor = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;

    data.chunks_exact(bytes_per_sample)
        .map(|raw| {
            let value: i32 = match bytes_per_sample {
                1 => raw[0] as i32 - 128,
                2 => i16::from_le_bytes([raw[0], raw[1]]) as i32,
                3 => i32::from_le_bytes([0, raw[0], raw[1], raw[2]]) >> 8,
                _ => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            };
            value as f32 * scale_factor
        })
        .collect()
}
