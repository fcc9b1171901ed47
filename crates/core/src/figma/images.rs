//! Local screenshots used in place of a Figma file.

use super::FigmaError;
use crate::llm::ImageAttachment;
use std::path::{Path, PathBuf};

/// One decoded design image ready to attach to a model request.
#[derive(Debug, Clone)]
pub struct DesignImage {
    pub path: PathBuf,
    pub attachment: ImageAttachment,
}

/// Read each image in order. Media type comes from the file extension.
pub async fn load_images(paths: &[PathBuf]) -> Result<Vec<DesignImage>, FigmaError> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        images.push(load_image(path).await?);
    }
    Ok(images)
}

async fn load_image(path: &Path) -> Result<DesignImage, FigmaError> {
    let image_error = |reason: String| FigmaError::Image {
        path: path.display().to_string(),
        reason,
    };

    let mime = mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| image_error("not a recognised image type".to_string()))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| image_error(e.to_string()))?;
    if bytes.is_empty() {
        return Err(image_error("file is empty".to_string()));
    }

    tracing::debug!(path = %path.display(), media_type = %mime, size = bytes.len(), "Loaded design image");
    Ok(DesignImage {
        path: path.to_path_buf(),
        attachment: ImageAttachment::from_bytes(mime.essence_str(), &bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_images_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("home.png");
        let second = dir.path().join("detail.jpg");
        std::fs::write(&first, [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::write(&second, [0xff, 0xd8, 0xff]).unwrap();

        let images = load_images(&[first.clone(), second]).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].path, first);
        assert_eq!(images[0].attachment.media_type, "image/png");
        assert_eq!(images[1].attachment.media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_images(&[dir.path().join("nope.png")]).await.unwrap_err();
        assert!(matches!(err, FigmaError::Image { .. }));
    }

    #[tokio::test]
    async fn test_non_image_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "hello").unwrap();

        let err = load_images(&[notes]).await.unwrap_err();
        assert!(err.to_string().contains("not a recognised image type"));
    }
}
