//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use avview::{Config, Frame};

/// Initialize FFmpeg quietly; safe to call from every test.
pub fn init() {
    let config = Config {
        log_level: avview::LogLevel::Quiet,
        ..Config::default()
    };
    avview::init(&config).expect("failed to initialize FFmpeg");

    #[cfg(feature = "tracing")]
    let _ = tracing_subscriber::fmt()
        .with_env_filter("avview=debug,avview_util=debug,avview_format=debug")
        .with_test_writer()
        .try_init();
}

/// Write a 16-bit PCM WAV file of a sawtooth wave and return its path.
pub fn write_wav(dir: &Path, sample_rate: u32, channels: u16, frames: u32) -> PathBuf {
    let block_align = channels * 2;
    let data_len = frames * block_align as u32;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..frames * channels as u32 {
        let sample = ((i % 256) as i16 - 128) * 64;
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    let path = dir.join("tone.wav");
    std::fs::write(&path, bytes).expect("failed to write WAV fixture");
    path
}

/// Fill every plane with a byte pattern unique to the plane.
pub fn fill_planes(frame: &mut Frame) {
    for plane in 0..frame.plane_count() {
        let bytes = frame.plane_mut(plane).expect("plane should be writable");
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = pattern(plane, i);
        }
    }
}

pub fn pattern(plane: usize, index: usize) -> u8 {
    (index as u8).wrapping_mul(7).wrapping_add(plane as u8 * 31)
}
