use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert_eq!(fps.secs_to_frames_round(1.5), 45);
    assert_eq!(fps.secs_to_frames_floor(0.99), 29);
}

#[test]
fn frame_is_sixteen_by_nine_and_eight_units_high() {
    let r = frame_rect();
    assert_eq!(r.height(), 8.0);
    assert!((r.width() / r.height() - 16.0 / 9.0).abs() < 1e-12);
    assert_eq!(r.center(), Point::ORIGIN);
}

#[test]
fn scene_to_pixels_flips_y_and_centres_origin() {
    let canvas = Canvas {
        width: 1920,
        height: 1080,
    };
    let m = canvas.scene_to_pixels();
    assert_eq!(m * Point::ORIGIN, Point::new(960.0, 540.0));
    let top = m * Point::new(0.0, FRAME_HEIGHT * 0.5);
    assert!((top.y - 0.0).abs() < 1e-9);
    let right = m * Point::new(FRAME_WIDTH * 0.5, 0.0);
    assert!((right.x - 1920.0).abs() < 1e-9);
}

#[test]
fn transform_affine_scales_around_position() {
    let t = Transform2D {
        position: Point::new(1.0, 2.0),
        scale: 2.0,
    };
    assert_eq!(t.to_affine() * Point::new(0.5, 0.0), Point::new(2.0, 2.0));
    assert_eq!(Transform2D::default().scale, 1.0);
}
