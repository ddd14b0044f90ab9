use super::*;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn png(name: &str) -> ImageFile {
    ImageFile::new(name, b"\x89PNG".to_vec()).expect("png image")
}

#[test]
fn accepts_png_and_jpeg_by_extension() {
    assert_eq!(png("bottle.png").kind(), ImageKind::Png);
    assert_eq!(
        ImageFile::new("bottle.JPG", Vec::new()).expect("jpg").kind(),
        ImageKind::Jpeg
    );
    assert_eq!(
        ImageFile::new("bottle.jpeg", Vec::new()).expect("jpeg").kind(),
        ImageKind::Jpeg
    );
}

#[test]
fn rejects_other_image_types() {
    assert_eq!(
        ImageFile::new("bottle.gif", Vec::new()),
        Err(ValidationError::UnsupportedImage("image/gif".into()))
    );
    assert_eq!(
        ImageFile::new("bottle", Vec::new()),
        Err(ValidationError::UnsupportedImage("unknown".into()))
    );
}

#[test]
fn missing_image_is_reported_before_empty_script() {
    let form = FormInput::default();
    assert_eq!(form.validate(), Err(ValidationError::MissingImage));
}

#[test]
fn whitespace_only_script_is_empty() {
    let form = FormInput {
        image: Some(png("a.png")),
        script: " \n\t ".into(),
    };
    assert_eq!(form.validate(), Err(ValidationError::EmptyScript));
}

#[test]
fn validated_form_keeps_script_untrimmed() {
    let form = FormInput {
        image: Some(png("a.png")),
        script: "  Meet the bottle.\n".into(),
    };
    let validated = form.validate().expect("valid");
    assert_eq!(validated.script(), "  Meet the bottle.\n");
    assert_eq!(validated.image().filename(), "a.png");
}

#[test]
fn counts_characters_not_bytes() {
    let form = FormInput {
        image: None,
        script: "café ☕".into(),
    };
    assert_eq!(form.script_char_count(), 6);
}

#[tokio::test]
async fn loads_image_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("vidgen_form_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("product.jpeg");
    fs::write(&path, b"jpeg-bytes").expect("write image");

    let image = ImageFile::from_path(&path).await.expect("load image");
    assert_eq!(image.filename(), "product.jpeg");
    assert_eq!(image.kind(), ImageKind::Jpeg);
    assert_eq!(image.bytes(), b"jpeg-bytes");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let path = env::temp_dir().join("vidgen_form_test_does_not_exist.png");
    let err = ImageFile::from_path(&path).await.expect_err("missing file");
    assert!(matches!(err, ImageLoadError::Io { .. }));
}

#[tokio::test]
async fn unsupported_path_is_rejected_without_reading() {
    let path = env::temp_dir().join("vidgen_form_test_does_not_exist.txt");
    let err = ImageFile::from_path(&path).await.expect_err("text file");
    assert!(matches!(
        err,
        ImageLoadError::Invalid(ValidationError::UnsupportedImage(_))
    ));
}
