use std::path::PathBuf;

use crate::prelude::*;

/// Presents a rendered image to the user.
///
/// The driver treats presentation as fire-and-forget: a failing viewer is
/// logged and never fails the run.
pub trait Viewer {
    fn show(&mut self, title: &str, image: &Image) -> Result<()>;
}

/// Logs a one-line summary of each image.
#[derive(Debug, Default)]
pub struct LogViewer;

impl Viewer for LogViewer {
    fn show(&mut self, title: &str, image: &Image) -> Result<()> {
        tracing::info!("{}: {}", title, image.desc());
        Ok(())
    }
}

/// Writes each image to `<dir>/<title>.png` for inspection in an external viewer.
#[derive(Debug)]
pub struct PreviewViewer {
    dir: PathBuf,
    shown: Vec<PathBuf>,
}

impl PreviewViewer {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            shown: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn shown(&self) -> &[PathBuf] {
        &self.shown
    }
}

impl Viewer for PreviewViewer {
    fn show(&mut self, title: &str, image: &Image) -> Result<()> {
        let file_name: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        let path = self.dir.join(format!("{}.png", file_name));

        image.save_file(&path)?;
        tracing::info!("{}: {} -> {}", title, image.desc(), path.display());

        self.shown.push(path);
        Ok(())
    }
}
