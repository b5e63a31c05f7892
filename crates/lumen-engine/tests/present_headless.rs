mod common;

use common::{assert_uniform, headless, pixel_at, solid, BLUE, GREEN, RED, WHITE};

use lumen_engine::coords::{FrameSize, ViewportSize};
use lumen_engine::render::screen::{
    FramePresenter, FrameStatus, PresentError, PresenterConfig, PresenterState, ScalingPolicy,
};

const DMG: FrameSize = FrameSize::DMG;

fn blue_clear(scaling: ScalingPolicy) -> PresenterConfig {
    PresenterConfig {
        scaling,
        clear_color: wgpu::Color::BLUE,
    }
}

#[test]
fn solid_red_frame_covers_exact_multiple_surface() {
    let Some(mut gpu) = headless("solid_red_frame_covers_exact_multiple_surface", 480, 432) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();
    assert_eq!(presenter.state(), PresenterState::Ready);

    let status = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(status, FrameStatus::Presented);
    assert_eq!(presenter.state(), PresenterState::Ready);

    let out = gpu.read_back().unwrap();
    assert_eq!(out.len(), 480 * 432 * 4);
    assert_uniform(&out, 480, RED);
}

#[test]
fn solid_red_frame_at_native_size() {
    let Some(mut gpu) = headless("solid_red_frame_at_native_size", 160, 144) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();

    assert_uniform(&gpu.read_back().unwrap(), 160, RED);
}

#[test]
fn stretch_fills_any_aspect() {
    let Some(mut gpu) = headless("stretch_fills_any_aspect", 300, 500) else {
        return;
    };

    let mut presenter = FramePresenter::new(blue_clear(ScalingPolicy::Stretch));
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();

    assert_uniform(&gpu.read_back().unwrap(), 300, RED);
}

#[test]
fn letterbox_clears_the_bars() {
    // Scale 3 on the height; the 480-wide image sits in the middle of 640.
    let Some(mut gpu) = headless("letterbox_clears_the_bars", 640, 432) else {
        return;
    };

    let mut presenter = FramePresenter::new(blue_clear(ScalingPolicy::Letterbox));
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();

    let out = gpu.read_back().unwrap();
    for y in [0, 216, 431] {
        assert_eq!(pixel_at(&out, 640, 0, y), BLUE);
        assert_eq!(pixel_at(&out, 640, 79, y), BLUE);
        assert_eq!(pixel_at(&out, 640, 80, y), RED);
        assert_eq!(pixel_at(&out, 640, 320, y), RED);
        assert_eq!(pixel_at(&out, 640, 559, y), RED);
        assert_eq!(pixel_at(&out, 640, 560, y), BLUE);
        assert_eq!(pixel_at(&out, 640, 639, y), BLUE);
    }
}

#[test]
fn row_zero_is_drawn_at_the_top() {
    let Some(mut gpu) = headless("row_zero_is_drawn_at_the_top", 480, 432) else {
        return;
    };

    // Quadrants: red top-left, green top-right, blue bottom-left, white bottom-right.
    let mut frame = Vec::with_capacity(DMG.pixel_count() * 4);
    for y in 0..144 {
        for x in 0..160 {
            let px = match (x < 80, y < 72) {
                (true, true) => RED,
                (false, true) => GREEN,
                (true, false) => BLUE,
                (false, false) => WHITE,
            };
            frame.extend_from_slice(&px);
        }
    }

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();
    presenter.render_frame(&mut gpu, &frame, 160, 144).unwrap();

    let out = gpu.read_back().unwrap();
    assert_eq!(pixel_at(&out, 480, 0, 0), RED);
    assert_eq!(pixel_at(&out, 480, 239, 215), RED);
    assert_eq!(pixel_at(&out, 480, 240, 0), GREEN);
    assert_eq!(pixel_at(&out, 480, 479, 215), GREEN);
    assert_eq!(pixel_at(&out, 480, 0, 216), BLUE);
    assert_eq!(pixel_at(&out, 480, 239, 431), BLUE);
    assert_eq!(pixel_at(&out, 480, 240, 216), WHITE);
    assert_eq!(pixel_at(&out, 480, 479, 431), WHITE);
}

#[test]
fn render_before_initialize_is_not_ready() {
    let Some(mut gpu) = headless("render_before_initialize_is_not_ready", 160, 144) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    let err = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap_err();
    assert_eq!(err, PresentError::NotReady);
    assert!(!err.is_fatal());
}

#[test]
fn zero_area_resize_is_accepted() {
    let Some(mut gpu) = headless("zero_area_resize_is_accepted", 480, 432) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();

    gpu.resize(ViewportSize::new(0, 0));
    presenter.resize(&gpu, ViewportSize::new(0, 0));
    let status = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(status, FrameStatus::Dropped);
    assert_eq!(presenter.state(), PresenterState::Ready);

    gpu.resize(ViewportSize::new(480, 432));
    presenter.resize(&gpu, ViewportSize::new(480, 432));
    let status = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(status, FrameStatus::Presented);
    assert_uniform(&gpu.read_back().unwrap(), 480, RED);
}

#[test]
fn zero_viewport_on_live_surface_draws_only_the_clear_colour() {
    let Some(mut gpu) = headless(
        "zero_viewport_on_live_surface_draws_only_the_clear_colour",
        480,
        432,
    ) else {
        return;
    };

    let mut presenter = FramePresenter::new(blue_clear(ScalingPolicy::Letterbox));
    presenter.initialize(&gpu, DMG).unwrap();

    // The surface keeps its size; only the presenter's viewport collapses.
    presenter.resize(&gpu, ViewportSize::new(0, 0));
    let status = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(status, FrameStatus::Presented);
    assert_eq!(presenter.viewport(), ViewportSize::new(0, 0));
    assert_uniform(&gpu.read_back().unwrap(), 480, BLUE);

    presenter.resize(&gpu, ViewportSize::new(480, 432));
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(presenter.viewport(), ViewportSize::new(480, 432));
    assert_uniform(&gpu.read_back().unwrap(), 480, RED);
}

#[test]
fn scaling_switch_applies_on_next_frame() {
    let Some(mut gpu) = headless("scaling_switch_applies_on_next_frame", 640, 432) else {
        return;
    };

    let mut presenter = FramePresenter::new(blue_clear(ScalingPolicy::Letterbox));
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_eq!(pixel_at(&gpu.read_back().unwrap(), 640, 0, 216), BLUE);

    presenter.set_scaling(ScalingPolicy::Stretch);
    assert_eq!(presenter.viewport(), ViewportSize::new(640, 432));
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();
    assert_uniform(&gpu.read_back().unwrap(), 640, RED);
}

#[test]
fn mismatched_frame_is_rejected_and_recoverable() {
    let Some(mut gpu) = headless("mismatched_frame_is_rejected_and_recoverable", 160, 144) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();

    let short = solid(FrameSize::new(160, 143), GREEN);
    let err = presenter
        .render_frame(&mut gpu, &short, 160, 144)
        .unwrap_err();
    assert!(matches!(err, PresentError::DimensionMismatch { .. }));
    assert!(!err.is_fatal());
    assert_eq!(presenter.state(), PresenterState::Failed);

    // Nothing was drawn for the rejected frame.
    assert_uniform(&gpu.read_back().unwrap(), 160, RED);

    presenter
        .render_frame(&mut gpu, &solid(DMG, GREEN), 160, 144)
        .unwrap();
    assert_eq!(presenter.state(), PresenterState::Ready);
    assert_uniform(&gpu.read_back().unwrap(), 160, GREEN);
    assert_eq!(presenter.upload_stats().rejected, 1);
}

#[test]
fn shutdown_releases_resources() {
    let Some(mut gpu) = headless("shutdown_releases_resources", 160, 144) else {
        return;
    };

    let mut presenter = FramePresenter::new(PresenterConfig::default());
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap();

    presenter.shutdown();
    assert_eq!(presenter.state(), PresenterState::Released);
    assert_eq!(presenter.resolution(), None);

    let err = presenter
        .render_frame(&mut gpu, &solid(DMG, RED), 160, 144)
        .unwrap_err();
    assert_eq!(err, PresentError::NotReady);

    // A released presenter can be brought back.
    presenter.initialize(&gpu, DMG).unwrap();
    presenter
        .render_frame(&mut gpu, &solid(DMG, GREEN), 160, 144)
        .unwrap();
    assert_uniform(&gpu.read_back().unwrap(), 160, GREEN);
}
