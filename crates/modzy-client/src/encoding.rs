//! Data URLs for embedded job inputs.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode `bytes` as `data:<media_type>;base64,<payload>`.
pub fn to_data_url(bytes: &[u8], media_type: &str) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Read a file and encode its content as a data URL.
pub async fn file_to_data_url(
    path: impl AsRef<Path>,
    media_type: &str,
) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(to_data_url(&bytes, media_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn encodes_bytes_with_media_type() {
        assert_eq!(
            to_data_url(b"Modzy", "text/plain"),
            "data:text/plain;base64,TW9kenk="
        );
        assert_eq!(
            to_data_url(&[], "application/octet-stream"),
            "data:application/octet-stream;base64,"
        );
    }

    #[tokio::test]
    async fn encodes_file_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xd8, 0xff]).unwrap();

        let url = file_to_data_url(file.path(), "image/jpeg").await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            file_to_data_url(dir.path().join("missing.png"), "image/png")
                .await
                .is_err()
        );
    }
}
