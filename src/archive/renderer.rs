use crate::config::PdfConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors raised by a PDF rendering backend
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to start renderer {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("renderer reported success but wrote no file to {0}")]
    NoOutput(PathBuf),
}

/// Converts a web page to a PDF file
pub trait PdfRenderer {
    /// Renders `url` into a PDF at `dest`
    fn render(&self, url: &str, dest: &Path) -> Result<(), RenderError>;
}

/// Renders through the external `wkhtmltopdf` executable
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    program: String,
    args: Vec<String>,
}

impl WkhtmltopdfRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(config.renderer.clone(), config.renderer_args.clone())
    }

    fn command(&self, url: &str, dest: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(url).arg(dest);
        command
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn render(&self, url: &str, dest: &Path) -> Result<(), RenderError> {
        let output = self
            .command(url, dest)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !dest.exists() {
            return Err(RenderError::NoOutput(dest.to_path_buf()));
        }

        Ok(())
    }
}
