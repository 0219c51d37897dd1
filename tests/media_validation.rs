use axum::body::Bytes;

use marketplace_services::{
    dto::media::UploadFile,
    services::media_service::{MAX_FILE_SIZE, sanitize_file_name, validate_file},
};

fn upload(name: &str, content_type: &str, bytes: Vec<u8>) -> UploadFile {
    UploadFile {
        file_name: Some(name.to_string()),
        content_type: Some(content_type.to_string()),
        bytes: Bytes::from(bytes),
    }
}

fn jpeg_body(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len.max(4)];
    bytes[0] = 0xFF;
    bytes[1] = 0xD8;
    bytes
}

#[test]
fn emoji_filename_sanitizes_to_plain_name() {
    assert_eq!(sanitize_file_name(Some("😎holiday.jpg")), "holiday.jpg");
}

#[test]
fn empty_filename_sanitizes_to_file() {
    assert_eq!(sanitize_file_name(Some("")), "file");
}

#[test]
fn upload_at_the_size_limit_passes_validation() {
    let file = upload("vacation.jpg", "image/jpeg", jpeg_body(MAX_FILE_SIZE));
    assert!(validate_file(&file).is_ok());
}

#[test]
fn oversize_upload_never_reaches_storage() {
    // validate_file runs before any storage call; an error here means the
    // bytes were dropped without an outbound request.
    let file = upload("vacation.jpg", "image/jpeg", jpeg_body(MAX_FILE_SIZE + 1));
    assert!(validate_file(&file).is_err());
}

#[test]
fn declared_type_must_match_content() {
    let file = upload("fake.gif", "image/gif", jpeg_body(64));
    assert!(validate_file(&file).is_err());
}

#[test]
fn traversal_filenames_are_rejected() {
    let file = upload("../escape.jpg", "image/jpeg", jpeg_body(64));
    assert!(validate_file(&file).is_err());
}
