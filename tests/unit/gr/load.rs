use std::path::PathBuf;

use super::*;

fn write_png(name: &str, w: u32, h: u32) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_gr_load");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    image::RgbaImage::from_pixel(w, h, image::Rgba([0, 128, 255, 255]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn load_from_file_fills_the_slot() {
    let path = write_png("a.png", 5, 3);
    let mut image = AutoRef::<ImageRef>::empty();
    load_from_file(image.addr(), &path).unwrap();
    assert!(!image.is_null());
    assert_eq!(native::image_width(&image).unwrap(), 5);
    assert_eq!(native::image_height(&image).unwrap(), 3);
    let h = image.get().unwrap();
    // The only reference left is the caller's; the provider went with the loader's wrappers.
    assert_eq!(native::retain_count(h), Some(1));
    drop(image);
    assert!(!native::is_live(h));
}

#[test]
fn load_from_url_accepts_paths_and_file_urls() {
    let path = write_png("b.png", 2, 2);
    let abs = std::fs::canonicalize(&path).unwrap();

    let mut by_path = AutoRef::<ImageRef>::empty();
    load_from_url(by_path.addr(), &path.to_string_lossy()).unwrap();
    let mut by_url = AutoRef::<ImageRef>::empty();
    load_from_url(by_url.addr(), &format!("file://{}", abs.display())).unwrap();

    assert_eq!(
        native::image_rgba8_premul(&by_path).unwrap(),
        native::image_rgba8_premul(&by_url).unwrap()
    );
}

#[test]
fn failed_load_leaves_the_slot_empty() {
    let mut image = AutoRef::<ImageRef>::empty();
    assert!(load_from_file(image.addr(), "target/unit_gr_load/does-not-exist.png").is_err());
    assert!(image.is_null());
    // Dropping a wrapper that never received a value releases nothing.
    drop(image);

    let mut slot = None;
    assert!(load_from_url(&mut slot, "ftp://example.com/a.png").is_err());
    assert_eq!(slot, None);
}

#[test]
fn undecodable_file_is_a_decode_error() {
    let dir = PathBuf::from("target").join("unit_gr_load");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("junk.png");
    std::fs::write(&path, b"junk").unwrap();
    let mut slot = None;
    let err = load_from_file(&mut slot, &path).unwrap_err();
    assert!(matches!(err, crate::GrError::Decode(_)), "{err}");
    assert!(slot.is_none());
}
