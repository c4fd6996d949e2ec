use super::*;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::handle::auto_ref::AutoRef;
use crate::native::color::{color_create_rgba8, color_space_create_device_rgb};
use crate::native::context::{
    bitmap_context_create, bitmap_context_create_image, context_fill_rect, context_set_fill_color,
};
use crate::native::url::url_create_from_file_path;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_destination");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

/// 4x2 image: left half opaque red, right half half-transparent green.
fn sample_image() -> AutoRef<ImageRef> {
    let space = AutoRef::new(color_space_create_device_rgb());
    let ctx = AutoRef::new(bitmap_context_create(4, 2, &space).unwrap());
    for (rect, color) in [
        (
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
        ),
        (
            Rect::new(2.0, 0.0, 4.0, 2.0),
            Rgba8Premul::from_straight_rgba(0, 255, 0, 128),
        ),
    ] {
        let color = AutoRef::new(color_create_rgba8(color).unwrap());
        context_set_fill_color(&ctx, &color).unwrap();
        context_fill_rect(&ctx, rect).unwrap();
    }
    AutoRef::new(bitmap_context_create_image(&ctx).unwrap())
}

#[test]
fn png_is_written_on_finalize_with_straight_alpha() {
    let path = scratch("out.png");
    let image = sample_image();
    let url = AutoRef::new(url_create_from_file_path(&path));
    let dest = destination_create_with_url(&url, ImageFormat::Png, 1).unwrap();
    destination_add_image(dest, &image, DestinationProps::default()).unwrap();
    assert!(!path.exists());

    destination_finalize(dest).unwrap();
    assert!(!table::is_live(dest));

    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (4, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
    let g = decoded.get_pixel(3, 1).0;
    assert_eq!(g[3], 128);
    assert!(g[1] >= 254, "{g:?}");
}

#[test]
fn jpeg_is_flattened_over_black() {
    let path = scratch("out.jpg");
    let image = sample_image();
    let url = AutoRef::new(url_create_from_file_path(&path));
    let dest = destination_create_with_url(&url, ImageFormat::Jpeg, 1).unwrap();
    destination_add_image(dest, &image, DestinationProps::with_quality(1.0)).unwrap();
    destination_finalize(dest).unwrap();

    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (4, 2));
    let [r, _, _] = decoded.get_pixel(0, 0).0;
    assert!(r > 200, "red survives: {r}");
    let [_, g, _] = decoded.get_pixel(3, 1).0;
    assert!((100..=160).contains(&g), "green over black is about half: {g}");
}

#[test]
fn destination_retains_url_and_image_until_closed() {
    let image = sample_image();
    let url = AutoRef::new(url_create_from_file_path(scratch("retain.png")));
    let dest = destination_create_with_url(&url, ImageFormat::Png, 1).unwrap();
    assert_eq!(table::retain_count(url.get().unwrap()), Some(2));
    destination_add_image(dest, &image, DestinationProps::default()).unwrap();
    assert_eq!(table::retain_count(image.get().unwrap()), Some(2));

    destination_finalize(dest).unwrap();
    assert_eq!(table::retain_count(url.get().unwrap()), Some(1));
    assert_eq!(table::retain_count(image.get().unwrap()), Some(1));
}

#[test]
fn single_image_formats_reject_other_counts() {
    let url = AutoRef::new(url_create_from_file_path(scratch("count.png")));
    assert!(matches!(
        destination_create_with_url(&url, ImageFormat::Png, 0),
        Err(GrError::Validation(_))
    ));
    assert!(destination_create_with_url(&url, ImageFormat::Jpeg, 2).is_err());
    assert_eq!(table::retain_count(url.get().unwrap()), Some(1));
}

#[test]
fn second_image_and_bad_quality_are_rejected() {
    let image = sample_image();
    let url = AutoRef::new(url_create_from_file_path(scratch("second.jpg")));
    let dest = AutoRef::new(destination_create_with_url(&url, ImageFormat::Jpeg, 1).unwrap());
    assert!(matches!(
        destination_add_image(&dest, &image, DestinationProps::with_quality(1.5)),
        Err(GrError::Validation(_))
    ));
    destination_add_image(&dest, &image, DestinationProps::default()).unwrap();
    assert!(matches!(
        destination_add_image(&dest, &image, DestinationProps::default()),
        Err(GrError::Encode(_))
    ));
}

#[test]
fn non_file_urls_are_unsupported() {
    let text = AutoRef::new(crate::native::string::string_create("http://example.com/x.png"));
    let url = AutoRef::new(crate::native::url::url_create_with_string(&text).unwrap());
    assert!(matches!(
        destination_create_with_url(&url, ImageFormat::Png, 1),
        Err(GrError::Unsupported(_))
    ));
}

#[test]
fn finalize_without_image_fails_but_closes() {
    let url = AutoRef::new(url_create_from_file_path(scratch("empty.png")));
    let dest = destination_create_with_url(&url, ImageFormat::Png, 1).unwrap();
    assert!(matches!(destination_finalize(dest), Err(GrError::Encode(_))));
    assert!(!table::is_live(dest));
}

#[test]
fn unwritable_path_surfaces_encode_error() {
    let image = sample_image();
    let path = PathBuf::from("target")
        .join("unit_destination")
        .join("no_such_dir")
        .join("x.png");
    let url = AutoRef::new(url_create_from_file_path(&path));
    let dest = destination_create_with_url(&url, ImageFormat::Png, 1).unwrap();
    destination_add_image(dest, &image, DestinationProps::default()).unwrap();
    assert!(matches!(destination_finalize(dest), Err(GrError::Encode(_))));
    assert!(!table::is_live(dest));
    assert_eq!(table::retain_count(image.get().unwrap()), Some(1));
}

#[test]
fn quality_maps_to_jpeg_scale() {
    assert_eq!(jpeg_quality_u8(0.0), 1);
    assert_eq!(jpeg_quality_u8(0.9), 90);
    assert_eq!(jpeg_quality_u8(1.0), 100);
    assert_eq!(jpeg_quality_u8(0.5), 50);
}
