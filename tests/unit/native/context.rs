use kurbo::Shape;

use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::handle::auto_ref::AutoRef;
use crate::native::color::{color_create_rgba8, color_space_create_device_rgb};

fn rgb_context(w: u32, h: u32) -> AutoRef<ContextRef> {
    let space = AutoRef::new(color_space_create_device_rgb());
    AutoRef::new(bitmap_context_create(w, h, &space).unwrap())
}

fn pixel(ctx: &AutoRef<ContextRef>, x: u32, y: u32) -> [u8; 4] {
    let w = bitmap_context_width(ctx).unwrap();
    let data = bitmap_context_data(ctx).unwrap();
    let i = ((y * w + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

fn set_fill(ctx: &AutoRef<ContextRef>, r: u8, g: u8, b: u8, a: u8) {
    let color =
        AutoRef::new(color_create_rgba8(Rgba8Premul::from_straight_rgba(r, g, b, a)).unwrap());
    context_set_fill_color(ctx, &color).unwrap();
}

#[test]
fn new_context_is_transparent() {
    let ctx = rgb_context(4, 3);
    assert_eq!(bitmap_context_width(&ctx).unwrap(), 4);
    assert_eq!(bitmap_context_height(&ctx).unwrap(), 3);
    assert!(bitmap_context_data(&ctx).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn zero_or_oversized_contexts_are_rejected() {
    let space = AutoRef::new(color_space_create_device_rgb());
    assert!(matches!(
        bitmap_context_create(0, 4, &space),
        Err(GrError::Validation(_))
    ));
    assert!(bitmap_context_create(4, 70_000, &space).is_err());
    assert!(bitmap_context_create(1, 1, None::<ColorSpaceRef>).is_err());
}

#[test]
fn context_keeps_space_alive() {
    let space = color_space_create_device_rgb();
    let ctx = AutoRef::new(bitmap_context_create(1, 1, space).unwrap());
    table::release(space);
    assert!(table::is_live(space));
    drop(ctx);
    assert!(!table::is_live(space));
}

#[test]
fn fill_rect_covers_exact_pixels() {
    let ctx = rgb_context(4, 4);
    set_fill(&ctx, 255, 0, 0, 255);
    context_fill_rect(&ctx, Rect::new(0.0, 0.0, 2.0, 4.0)).unwrap();
    assert_eq!(pixel(&ctx, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&ctx, 1, 3), [255, 0, 0, 255]);
    assert_eq!(pixel(&ctx, 2, 0), [0, 0, 0, 0]);
    assert_eq!(pixel(&ctx, 3, 3), [0, 0, 0, 0]);
}

#[test]
fn later_draws_composite_over_earlier_ones() {
    let ctx = rgb_context(2, 1);
    set_fill(&ctx, 0, 0, 255, 255);
    context_fill_rect(&ctx, Rect::new(0.0, 0.0, 2.0, 1.0)).unwrap();
    set_fill(&ctx, 255, 0, 0, 255);
    context_fill_rect(&ctx, Rect::new(1.0, 0.0, 2.0, 1.0)).unwrap();
    assert_eq!(pixel(&ctx, 0, 0), [0, 0, 255, 255]);
    assert_eq!(pixel(&ctx, 1, 0), [255, 0, 0, 255]);
}

#[test]
fn default_fill_is_opaque_black() {
    let ctx = rgb_context(1, 1);
    context_fill_rect(&ctx, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert_eq!(pixel(&ctx, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn stroke_only_leaves_the_interior_empty() {
    let ctx = rgb_context(20, 20);
    let stroke = AutoRef::new(
        color_create_rgba8(Rgba8Premul::from_straight_rgba(0, 255, 0, 255)).unwrap(),
    );
    context_set_stroke_color(&ctx, &stroke).unwrap();
    context_set_line_width(&ctx, 2.0).unwrap();
    let path = kurbo::Rect::new(2.0, 2.0, 18.0, 18.0).to_path(0.1);
    context_draw_path(&ctx, &path, DrawMode::Stroke).unwrap();
    assert_eq!(pixel(&ctx, 10, 10), [0, 0, 0, 0]);
    assert_eq!(pixel(&ctx, 2, 10)[1], 255);

    context_draw_path(&ctx, &path, DrawMode::Fill).unwrap();
    assert_eq!(pixel(&ctx, 10, 10), [0, 0, 0, 255]);
}

#[test]
fn even_odd_fill_leaves_a_hole() {
    let ctx = rgb_context(20, 20);
    let mut path = kurbo::Rect::new(0.0, 0.0, 20.0, 20.0).to_path(0.1);
    path.extend(kurbo::Rect::new(5.0, 5.0, 15.0, 15.0).to_path(0.1));
    context_draw_path(&ctx, &path, DrawMode::EoFill).unwrap();
    assert_eq!(pixel(&ctx, 1, 1)[3], 255);
    assert_eq!(pixel(&ctx, 10, 10)[3], 0);

    let ctx = rgb_context(20, 20);
    context_draw_path(&ctx, &path, DrawMode::Fill).unwrap();
    assert_eq!(pixel(&ctx, 10, 10)[3], 255);
}

#[test]
fn line_width_is_validated() {
    let ctx = rgb_context(1, 1);
    assert!(context_set_line_width(&ctx, -1.0).is_err());
    assert!(context_set_line_width(&ctx, f64::INFINITY).is_err());
    assert!(context_set_line_width(&ctx, 0.0).is_ok());
    assert!(context_fill_rect(&ctx, Rect::new(0.0, 0.0, f64::NAN, 1.0)).is_err());
}

#[test]
fn with_data_starts_from_caller_pixels() {
    let space = AutoRef::new(color_space_create_device_rgb());
    let data = vec![10, 20, 30, 255, 0, 0, 0, 0];
    let ctx = AutoRef::new(bitmap_context_create_with_data(data.clone(), 2, 1, &space).unwrap());
    assert_eq!(bitmap_context_data(&ctx).unwrap(), data);

    let err = bitmap_context_create_with_data(vec![0; 7], 2, 1, &space).unwrap_err();
    assert!(matches!(err, GrError::Validation(_)));
}

#[test]
fn snapshot_is_independent_of_later_drawing() {
    let ctx = rgb_context(2, 2);
    set_fill(&ctx, 255, 255, 255, 255);
    context_fill_rect(&ctx, Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    let snap = AutoRef::new(bitmap_context_create_image(&ctx).unwrap());
    set_fill(&ctx, 0, 0, 0, 255);
    context_fill_rect(&ctx, Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();

    let px = crate::native::image::image_rgba8_premul(&snap).unwrap();
    assert!(px.iter().all(|&b| b == 255));
}

#[test]
fn draw_image_scales_into_rect() {
    let src = rgb_context(2, 2);
    set_fill(&src, 0, 0, 255, 255);
    context_fill_rect(&src, Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    let image = AutoRef::new(bitmap_context_create_image(&src).unwrap());

    let dst = rgb_context(8, 8);
    context_draw_image(&dst, Rect::new(0.0, 0.0, 4.0, 8.0), &image).unwrap();
    let [r, g, b, a] = pixel(&dst, 1, 4);
    assert!(r <= 2 && g <= 2 && b >= 253 && a >= 253, "{r} {g} {b} {a}");
    assert_eq!(pixel(&dst, 6, 4), [0, 0, 0, 0]);
}

#[test]
fn draw_mode_parts() {
    assert_eq!(DrawMode::Stroke.fill_rule(), None);
    assert!(DrawMode::FillStroke.strokes());
    assert!(!DrawMode::EoFill.strokes());
    assert_eq!(
        serde_json::to_string(&DrawMode::EoFillStroke).unwrap(),
        "\"eo_fill_stroke\""
    );
}

#[test]
fn premul_over_blends() {
    let mut dst = vec![0, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128]).unwrap();
    assert_eq!(dst, vec![128, 0, 127, 255]);
    assert!(premul_over_in_place(&mut dst, &[0; 8]).is_err());
}
