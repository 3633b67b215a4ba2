use std::path::Path;

use crate::error::ServiceError;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Admission policy for uploaded profile images.
///
/// Checks the supplied filename's extension against a fixed allow-list
/// (case-insensitive) and rejects empty payloads. This is a naming
/// convention check only — bytes are never sniffed and are stored as an
/// opaque blob. Known limitation, kept on purpose.
pub fn validate_image(filename: &str, byte_length: usize) -> Result<(), ServiceError> {
    if byte_length == 0 {
        return Err(ServiceError::Validation("No file uploaded.".into()));
    }
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(ServiceError::Validation(
            "Invalid file type. Only image files are allowed.".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions() {
        for name in ["a.jpg", "a.jpeg", "a.png", "a.gif"] {
            assert!(validate_image(name, 10).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(validate_image("avatar.PNG", 10).is_ok());
        assert!(validate_image("avatar.Jpg", 10).is_ok());
        assert!(validate_image("AVATAR.GIF", 10).is_ok());
    }

    #[test]
    fn rejects_disallowed_extensions() {
        for name in ["avatar.exe", "avatar.svg", "avatar.png.sh", "avatar"] {
            assert!(validate_image(name, 10).is_err(), "{name} should fail");
        }
    }

    #[test]
    fn rejects_empty_payload() {
        let err = validate_image("avatar.png", 0).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
