use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ports::FrameSource;
use crate::domain::{CameraFacing, Frame, PipelineError};

/// FrameSource that replays JPEG files from `<root>/front` and `<root>/back`,
/// one file per capture, wrapping around at the end.
pub struct ImageDirectoryFrameSource {
    root: PathBuf,
    state: Mutex<CursorState>,
}

struct CursorState {
    facing: CameraFacing,
    next: usize,
}

impl ImageDirectoryFrameSource {
    pub fn new(root: impl Into<PathBuf>, facing: CameraFacing) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(CursorState { facing, next: 0 }),
        }
    }

    fn directory(&self, facing: CameraFacing) -> PathBuf {
        self.root.join(facing.as_str())
    }
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

async fn list_jpegs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::Acquisition(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::Acquisition(e.to_string()))?
    {
        let path = entry.path();
        if is_jpeg(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl FrameSource for ImageDirectoryFrameSource {
    async fn capture(&self) -> Result<Frame, PipelineError> {
        let mut state = self.state.lock().await;
        let dir = self.directory(state.facing);
        let files = list_jpegs(&dir).await?;
        if files.is_empty() {
            return Err(PipelineError::Acquisition(format!(
                "no images in {}",
                dir.display()
            )));
        }

        let path = &files[state.next % files.len()];
        state.next = (state.next + 1) % files.len();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::Acquisition(format!("{}: {}", path.display(), e)))?;
        Ok(Frame::new(data, state.facing))
    }

    async fn switch_facing(&self, facing: CameraFacing) -> Result<(), PipelineError> {
        let dir = self.directory(facing);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(PipelineError::Acquisition(format!(
                "no {} camera at {}",
                facing.as_str(),
                dir.display()
            )));
        }
        let mut state = self.state.lock().await;
        state.facing = facing;
        state.next = 0;
        debug!("switched to {} camera", facing.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let back = dir.path().join("back");
        std::fs::create_dir(&back).unwrap();
        std::fs::write(back.join("a.jpg"), [1u8]).unwrap();
        std::fs::write(back.join("b.JPEG"), [2u8]).unwrap();
        std::fs::write(back.join("notes.txt"), b"skip me").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_capture_cycles_through_jpegs() {
        let dir = camera_dir();
        let source = ImageDirectoryFrameSource::new(dir.path(), CameraFacing::Back);

        let mut seen = Vec::new();
        for _ in 0..3 {
            let frame = source.capture().await.unwrap();
            assert_eq!(frame.facing(), CameraFacing::Back);
            seen.push(frame.data()[0]);
        }
        assert_eq!(seen, vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_switch_to_missing_camera_fails_and_keeps_facing() {
        let dir = camera_dir();
        let source = ImageDirectoryFrameSource::new(dir.path(), CameraFacing::Back);

        let err = source.switch_facing(CameraFacing::Front).await.unwrap_err();
        assert!(matches!(err, PipelineError::Acquisition(_)));
        assert_eq!(source.capture().await.unwrap().facing(), CameraFacing::Back);
    }

    #[tokio::test]
    async fn test_switch_facing_reads_other_directory() {
        let dir = camera_dir();
        let front = dir.path().join("front");
        std::fs::create_dir(&front).unwrap();
        std::fs::write(front.join("selfie.jpg"), [7u8]).unwrap();
        let source = ImageDirectoryFrameSource::new(dir.path(), CameraFacing::Back);

        source.switch_facing(CameraFacing::Front).await.unwrap();
        let frame = source.capture().await.unwrap();
        assert_eq!(frame.facing(), CameraFacing::Front);
        assert_eq!(frame.data().as_ref(), &[7u8]);
    }
}
