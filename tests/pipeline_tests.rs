// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the frame pipeline lifecycle

use edge_viewer::gpu::HeadlessTexture;
use edge_viewer::{
    FrameBridge, FrameDimensions, FramePipeline, HeadlessContext, PipelineConfig, PipelineError,
    PipelineState, ProcessingMode, TextureResource,
};

fn init_logging() {
    // Set RUST_LOG to see pipeline logs, e.g. RUST_LOG=edge_viewer=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn pipeline() -> FramePipeline<HeadlessContext> {
    init_logging();
    FramePipeline::new(HeadlessContext::new(), PipelineConfig::default())
}

/// Uniform NV21 frame: luma plane then V/U pairs
fn uniform_nv21(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
    let pixels = (width * height) as usize;
    let mut data = vec![y; pixels];
    for _ in 0..pixels / 4 {
        data.extend_from_slice(&[v, u]);
    }
    data
}

fn texture(p: &FramePipeline<HeadlessContext>) -> &HeadlessTexture {
    p.texture().expect("pipeline should be initialized")
}

#[test]
fn test_mid_gray_passthrough() {
    let mut p = pipeline();
    p.init(4, 4).unwrap();

    let frame = uniform_nv21(4, 4, 128, 128, 128);
    assert_eq!(frame.len(), 24);

    let handle = p
        .process_frame(&frame, 4, 4, ProcessingMode::Passthrough, 1_000)
        .unwrap();
    assert!(handle.as_raw() != 0);

    let contents = texture(&p).contents().unwrap();
    let first = contents.pixel(0, 0);
    assert!(contents.pixels().iter().all(|p| *p == first));

    // BT.601 limited range: (128 - 16) * 1.164 ≈ 130
    for channel in &first[..3] {
        assert!((*channel as i32 - 130).abs() <= 2, "channel {channel}");
    }
    assert_eq!(first[3], 255);
}

#[test]
fn test_edge_detect_on_flat_field_is_black() {
    let mut p = pipeline();
    p.init(4, 4).unwrap();

    let frame = uniform_nv21(4, 4, 180, 90, 200);
    p.process_frame(&frame, 4, 4, ProcessingMode::EdgeDetect, 0)
        .unwrap();

    let contents = texture(&p).contents().unwrap();
    assert!(contents.pixels().iter().all(|p| *p == [0, 0, 0, 255]));
}

#[test]
fn test_edge_output_is_binary() {
    let mut p = pipeline();
    p.init(16, 16).unwrap();

    // Bright square on a dark background
    let mut frame = uniform_nv21(16, 16, 20, 128, 128);
    for y in 4..12 {
        for x in 4..12 {
            frame[y * 16 + x] = 230;
        }
    }

    p.process_frame(&frame, 16, 16, ProcessingMode::EdgeDetect, 0)
        .unwrap();

    let contents = texture(&p).contents().unwrap();
    let mut edges = 0;
    for pixel in contents.pixels() {
        assert_eq!(pixel[3], 255);
        match &pixel[..3] {
            [0, 0, 0] => {}
            [255, 255, 255] => edges += 1,
            _ => panic!("non-binary pixel {:?}", pixel),
        }
    }
    assert!(edges > 0, "square outline should produce edges");
}

#[test]
fn test_handle_dimensions_match_init_in_both_modes() {
    let mut p = pipeline();
    p.init(8, 6).unwrap();
    let frame = uniform_nv21(8, 6, 100, 120, 140);

    let mut handles = Vec::new();
    for mode in ProcessingMode::ALL {
        handles.push(p.process_frame(&frame, 8, 6, mode, 0).unwrap());
        let texture = texture(&p);
        assert_eq!(texture.dimensions(), FrameDimensions::new(8, 6).unwrap());
        assert_eq!(texture.contents().unwrap().dimensions(), texture.dimensions());
    }

    // One texture for the whole lifetime
    assert_eq!(handles[0], handles[1]);
}

#[test]
fn test_luma_only_buffer_uses_grayscale_fallback() {
    let mut p = pipeline();
    p.init(4, 4).unwrap();

    let frame: Vec<u8> = (0..16u8).map(|i| 40 + i * 8).collect();
    p.process_frame(&frame, 4, 4, ProcessingMode::Passthrough, 0)
        .unwrap();

    let contents = texture(&p).contents().unwrap();
    for pixel in contents.pixels() {
        assert_eq!(pixel[0], pixel[1]);
        assert_eq!(pixel[1], pixel[2]);
    }
}

#[test]
fn test_luma_only_buffer_rejected_when_fallback_disabled() {
    init_logging();
    let config = PipelineConfig {
        allow_luma_only: false,
        ..Default::default()
    };
    let mut p = FramePipeline::new(HeadlessContext::new(), config);
    p.init(4, 4).unwrap();

    let result = p.process_frame(&[128; 16], 4, 4, ProcessingMode::Passthrough, 0);
    assert_eq!(
        result,
        Err(PipelineError::BufferSizeMismatch {
            expected: 24,
            actual: 16
        })
    );
    // Rejected before any GPU call
    assert!(!texture(&p).is_allocated());
}

#[test]
fn test_lifecycle_idempotence() {
    let mut p = pipeline();
    p.release().unwrap();
    assert_eq!(p.state(), PipelineState::Uninitialized);

    p.init(4, 4).unwrap();
    p.init(4, 4).unwrap();
    assert_eq!(p.dimensions(), Some(FrameDimensions::new(4, 4).unwrap()));

    p.release().unwrap();
    p.release().unwrap();
    assert_eq!(p.state(), PipelineState::Released);
}

#[test]
fn test_decoder_is_deterministic_through_pipeline() {
    let mut p = pipeline();
    p.init(8, 8).unwrap();
    let frame: Vec<u8> = (0..96u32).map(|i| (i * 29 % 256) as u8).collect();

    p.process_frame(&frame, 8, 8, ProcessingMode::Passthrough, 0)
        .unwrap();
    let first = texture(&p).contents().unwrap();
    p.process_frame(&frame, 8, 8, ProcessingMode::Passthrough, 1)
        .unwrap();
    let second = texture(&p).contents().unwrap();

    assert_eq!(first, second);
    assert_eq!(texture(&p).upload_count(), 2);
}

#[test]
fn test_bridge_before_init_returns_zero() {
    init_logging();
    let mut bridge = FrameBridge::new(HeadlessContext::new(), PipelineConfig::default());
    assert_eq!(bridge.process_frame(&[128; 24], 4, 4, 0, 0), 0);
    assert_eq!(
        bridge.last_error(),
        Some(&PipelineError::UninitializedPipeline)
    );
}

#[test]
fn test_bridge_full_lifecycle() {
    init_logging();
    let mut bridge = FrameBridge::new(HeadlessContext::new(), PipelineConfig::default());
    bridge.init(4, 4);

    let frame = uniform_nv21(4, 4, 128, 128, 128);
    let first = bridge.process_frame(&frame, 4, 4, 10, 0);
    let second = bridge.process_frame(&frame, 4, 4, 20, 1);
    assert_ne!(first, 0);
    assert_eq!(first, second);
    assert_eq!(bridge.pipeline().stats().frames_processed, 2);
    assert_eq!(bridge.pipeline().stats().last_timestamp_ns, Some(20));

    bridge.release();
    bridge.release();
    assert_eq!(bridge.process_frame(&frame, 4, 4, 30, 0), 0);
}

#[test]
#[should_panic(expected = "rendering context")]
fn test_bridge_panics_on_context_violation() {
    init_logging();
    let context = std::thread::spawn(HeadlessContext::new).join().unwrap();
    let mut bridge = FrameBridge::new(context, PipelineConfig::default());
    bridge.init(4, 4);

    // Context belongs to the spawned thread, not this one
    bridge.process_frame(&uniform_nv21(4, 4, 128, 128, 128), 4, 4, 0, 0);
}
