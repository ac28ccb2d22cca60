//! Integration tests for audio sample buffers and audio frames.

mod common;

use avview::util::{averror, buffer_size};
use avview::{Config, Frame, Sample, SampleBuffer};
use ffmpeg_the_third::ffi::AV_CH_LAYOUT_5POINT1;
use ffmpeg_the_third::format::sample::Type;

#[test]
fn zero_channels_returns_einval() {
    common::init();
    let err = SampleBuffer::alloc(0, 1024, Sample::F32(Type::Planar), 0).unwrap_err();
    assert_eq!(err.code(), Some(averror(libc::EINVAL)));
}

#[test]
fn zero_samples_returns_einval() {
    common::init();
    let err = SampleBuffer::alloc(2, 0, Sample::I16(Type::Packed), 0).unwrap_err();
    assert_eq!(err.code(), Some(averror(libc::EINVAL)));

    let err = SampleBuffer::alloc(0, 0, Sample::I16(Type::Packed), 0).unwrap_err();
    assert_eq!(err.code(), Some(averror(libc::EINVAL)));
}

#[test]
fn configured_sample_alignment() {
    common::init();
    let config = Config::from_toml_str("sample_align = 1").unwrap();

    // 3 samples of packed stereo s16 is 12 bytes; alignment 1 keeps it exact.
    let buf = avview::sample_buffer(&config, 2, 3, Sample::I16(Type::Packed)).unwrap();
    assert_eq!(buf.linesize(), 12);
    assert_eq!(
        buffer_size(2, 3, Sample::I16(Type::Packed), 1).unwrap(),
        buf.linesize() as usize
    );
}

#[test]
fn planar_buffer_planes_are_independent() {
    common::init();
    let mut buf = SampleBuffer::alloc(6, 512, Sample::F32(Type::Planar), 0).unwrap();
    assert_eq!(buf.planes(), 6);
    assert_eq!(buf.channels(), 6);
    assert_eq!(buf.samples(), 512);

    for ch in 0..6 {
        buf.plane_mut(ch).unwrap().fill(ch as u8 + 1);
    }
    for ch in 0..6 {
        assert!(buf.plane(ch).unwrap().iter().all(|b| *b == ch as u8 + 1));
    }
}

#[test]
fn audio_frame_layout() {
    common::init();
    let mut frame = Frame::new().unwrap();
    frame
        .set_audio_format(960, Sample::I16(Type::Packed), AV_CH_LAYOUT_5POINT1, 0)
        .unwrap();
    frame.set_sample_rate(48_000);

    assert_eq!(frame.channels(), 6);
    assert_eq!(frame.channel_layout(), AV_CH_LAYOUT_5POINT1);
    assert_eq!(frame.sample_format(), Some(Sample::I16(Type::Packed)));
    assert_eq!(frame.plane_count(), 1);
    assert!(frame.plane(0).unwrap().len() >= 960 * 6 * 2);
    assert_eq!(frame.sample_rate(), 48_000);
}

#[test]
fn audio_frame_rejects_empty_layout() {
    common::init();
    let mut frame = Frame::new().unwrap();
    let err = frame
        .set_audio_format(960, Sample::F32(Type::Planar), 0, 0)
        .unwrap_err();
    assert!(err.code().is_some());
}
