use moca_capture::error::CaptureError;
use moca_capture::drawing::{
    DrawingSurface, PointerEvent, PointerPhase, PointerSource, CANVAS_HEIGHT, CANVAS_WIDTH,
};

fn event(source: PointerSource, phase: PointerPhase, x: f32, y: f32) -> PointerEvent {
    PointerEvent { source, phase, x, y }
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8()
}

#[test]
fn move_without_pen_down_draws_nothing() {
    let mut surface = DrawingSurface::default();
    let snapshot = surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, 5.0, 5.0))
        .unwrap();
    assert!(snapshot.is_none());
    assert!(surface.snapshot().is_none());
}

#[test]
fn every_segment_emits_a_snapshot() {
    let mut surface = DrawingSurface::default();
    surface
        .handle(event(PointerSource::Touch, PointerPhase::Down, 10.0, 10.0))
        .unwrap();

    let first = surface
        .handle(event(PointerSource::Touch, PointerPhase::Move, 20.0, 10.0))
        .unwrap()
        .cloned()
        .unwrap();
    let second = surface
        .handle(event(PointerSource::Touch, PointerPhase::Move, 20.0, 30.0))
        .unwrap()
        .cloned()
        .unwrap();

    assert_ne!(first.png, second.png);
    assert_eq!(second.width, CANVAS_WIDTH);
    assert_eq!(second.height, CANVAS_HEIGHT);
    assert!(second.to_data_url().starts_with("data:image/png;base64,"));

    let image = decode(&second.png);
    assert_eq!(image.get_pixel(15, 10).0, [0x22, 0x22, 0x22, 0xff]);
    assert_eq!(image.get_pixel(20, 20).0, [0x22, 0x22, 0x22, 0xff]);
    assert_eq!(image.get_pixel(100, 100).0, [0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn display_coordinates_are_scaled_to_canvas() {
    let mut surface = DrawingSurface::default();
    surface.set_display_size(175.0, 175.0);
    assert_eq!(surface.to_canvas(50.0, 100.0), (100, 200));

    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Down, 50.0, 50.0))
        .unwrap();
    let snapshot = surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, 60.0, 50.0))
        .unwrap()
        .cloned()
        .unwrap();

    let image = decode(&snapshot.png);
    assert_eq!(image.get_pixel(110, 100).0, [0x22, 0x22, 0x22, 0xff]);
    assert_eq!(image.get_pixel(60, 50).0, [0xff, 0xff, 0xff, 0xff]);
}

#[test]
fn leaving_the_surface_lifts_the_pen() {
    let mut surface = DrawingSurface::default();
    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Down, 1.0, 1.0))
        .unwrap();
    assert!(surface.is_drawing());
    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Leave, 400.0, 1.0))
        .unwrap();
    assert!(!surface.is_drawing());
    let after = surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, 10.0, 1.0))
        .unwrap();
    assert!(after.is_none());
}

#[test]
fn strokes_off_canvas_are_clipped() {
    let mut surface = DrawingSurface::default();
    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Down, -20.0, -20.0))
        .unwrap();
    let snapshot = surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, 5.0, 5.0))
        .unwrap();
    assert!(snapshot.is_some());
}

#[test]
fn non_positive_display_size_falls_back_to_canvas() {
    let mut surface = DrawingSurface::default();
    surface.set_display_size(0.0, -1.0);
    assert_eq!(surface.to_canvas(12.0, 34.0), (12, 34));
}

#[test]
fn far_off_surface_points_are_pinned_to_the_edge() {
    let mut surface = DrawingSurface::default();
    assert_eq!(surface.to_canvas(-1e30, 2e8), (-2, CANVAS_HEIGHT as i64 + 2));

    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Down, 10.0, 10.0))
        .unwrap();
    let snapshot = surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, -1e30, 10.0))
        .unwrap()
        .cloned()
        .unwrap();
    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Move, 2e8, 10.0))
        .unwrap();

    let image = decode(&snapshot.png);
    assert_eq!(image.get_pixel(0, 10).0, [0x22, 0x22, 0x22, 0xff]);
    assert_eq!(image.get_pixel(10, 10).0, [0x22, 0x22, 0x22, 0xff]);
}

#[test]
fn non_finite_points_are_rejected() {
    let mut surface = DrawingSurface::default();
    surface
        .handle(event(PointerSource::Mouse, PointerPhase::Down, 10.0, 10.0))
        .unwrap();
    for (x, y) in [(f32::INFINITY, 10.0), (10.0, f32::NEG_INFINITY), (f32::NAN, 1.0)] {
        let err = surface
            .handle(event(PointerSource::Mouse, PointerPhase::Move, x, y))
            .err()
            .unwrap();
        assert!(matches!(err, CaptureError::InvalidPoint { .. }));
    }
    assert!(surface.snapshot().is_none());
    assert!(surface.is_drawing());
}
