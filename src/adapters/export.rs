use crate::domain::ports::{DocumentExporter, ExportOptions};
use crate::utils::error::{ContractError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const DEFAULT_PDF_PROGRAM: &str = "wkhtmltopdf";
const BASE_DPI: u32 = 96;

fn html_name(filename: &str) -> String {
    let stem = filename.strip_suffix(".pdf").unwrap_or(filename);
    format!("{stem}.html")
}

async fn write_html(output_dir: &Path, filename: &str, html: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(html_name(filename));
    tokio::fs::write(&path, html).await?;
    Ok(path)
}

/// Writes the printable page as-is; opening it in a browser and printing is
/// left to the user.
pub struct HtmlFileExporter {
    output_dir: PathBuf,
}

impl HtmlFileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl DocumentExporter for HtmlFileExporter {
    async fn export(&self, html: &str, options: &ExportOptions) -> Result<PathBuf> {
        let path = write_html(&self.output_dir, &options.filename, html).await?;
        tracing::info!("📄 Contract page written to {}", path.display());
        Ok(path)
    }
}

/// Converts the page with an external HTML-to-PDF program taking
/// wkhtmltopdf-style arguments: `[options] <input.html> <output.pdf>`.
pub struct ExternalPdfExporter {
    program: String,
    extra_args: Vec<String>,
    output_dir: PathBuf,
}

impl ExternalPdfExporter {
    pub fn new(program: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn program_args(&self, options: &ExportOptions, input: &Path, output: &Path) -> Vec<String> {
        let [top, right, bottom, left] = options.margins_mm;
        let quality = (options.image_quality.clamp(0.0, 1.0) * 100.0).round() as u32;
        let mut args = vec![
            "--quiet".to_string(),
            "--page-size".to_string(),
            options.page_format.as_str().to_string(),
            "--orientation".to_string(),
            options.orientation.as_str().to_string(),
            "--margin-top".to_string(),
            format!("{top}mm"),
            "--margin-right".to_string(),
            format!("{right}mm"),
            "--margin-bottom".to_string(),
            format!("{bottom}mm"),
            "--margin-left".to_string(),
            format!("{left}mm"),
            "--image-quality".to_string(),
            quality.to_string(),
            "--dpi".to_string(),
            (BASE_DPI * options.scale.max(1)).to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(input.display().to_string());
        args.push(output.display().to_string());
        args
    }
}

#[async_trait]
impl DocumentExporter for ExternalPdfExporter {
    async fn export(&self, html: &str, options: &ExportOptions) -> Result<PathBuf> {
        let input = write_html(&self.output_dir, &options.filename, html).await?;
        let output = self.output_dir.join(&options.filename);
        let args = self.program_args(options, &input, &output);

        tracing::debug!("Running {} {:?}", self.program, args);
        let result = Command::new(&self.program).args(&args).output().await;

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContractError::ExportUnavailable {
                    message: format!("'{}' was not found on PATH", self.program),
                });
            }
            Err(e) => {
                return Err(ContractError::ExportFailed {
                    message: format!("could not start '{}': {}", self.program, e),
                });
            }
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(ContractError::ExportFailed {
                message: format!("'{}' exited with {}: {}", self.program, out.status, stderr.trim()),
            });
        }

        tracing::info!("📄 Contract PDF written to {}", output.display());
        Ok(output)
    }
}
