use super::Input;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use muse_config::Config;
use muse_core::export::{
    export_text_pdf, save_document, standalone_html, HTML_MIME, MARKDOWN_MIME, PDF_MIME,
};
use muse_core::render::{to_html, RenderOptions};
use muse_core::SourceFormat;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Md,
    Html,
    Pdf,
}

impl ExportFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }

    fn mime(&self) -> &'static str {
        match self {
            Self::Md => MARKDOWN_MIME,
            Self::Html => HTML_MIME,
            Self::Pdf => PDF_MIME,
        }
    }
}

/// Export content to a file.
#[derive(Parser, Debug, Clone)]
pub struct Export {
    /// Output format.
    #[clap(long, value_enum, default_value_t = ExportFormat::Md)]
    format: ExportFormat,

    /// File name of the export, `<input name>.<format>` by default.
    #[clap(long)]
    name: Option<String>,

    /// Directory to write into, overrides `export.output-dir`.
    #[clap(long)]
    output_dir: Option<PathBuf>,

    /// Document title for HTML exports, the file name by default.
    #[clap(long)]
    title: Option<String>,

    /// Source format, guessed from the file extension by default.
    #[clap(long)]
    source_format: Option<SourceFormat>,

    #[clap(flatten)]
    input: Input,
}

impl Export {
    pub async fn run(self, config: &Config) -> Result<()> {
        let markdown = self.input.read_markdown(self.source_format)?;
        let stem = self
            .input
            .file_stem()
            .unwrap_or_else(|| "magicmuse-export".to_string());

        let contents = match self.format {
            ExportFormat::Md => markdown.into_bytes(),
            ExportFormat::Html => {
                let title = self.title.as_deref().unwrap_or(&stem);
                standalone_html(title, &to_html(&markdown, &RenderOptions::default())).into_bytes()
            }
            ExportFormat::Pdf => export_text_pdf(&markdown, &config.export.page_geometry())?,
        };

        let file_name = self
            .name
            .unwrap_or_else(|| format!("{stem}.{}", self.format.extension()));
        let output_dir = self
            .output_dir
            .unwrap_or_else(|| config.export.output_dir());

        let saved = save_document(&output_dir, &file_name, contents, self.format.mime()).await?;

        tracing::info!(
            path = %saved.path.display(),
            mime = %saved.mime,
            size = saved.size,
            "Exported document"
        );
        println!("{}", saved.path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("brief.html");
        std::fs::write(&source, "<h1>Brief</h1><p>Body</p>").unwrap();

        let export = Export {
            format: ExportFormat::Html,
            name: None,
            output_dir: Some(dir.path().join("out")),
            title: None,
            source_format: None,
            input: Input {
                input: Some(source),
            },
        };
        export.run(&Config::default()).await.unwrap();

        let page = std::fs::read_to_string(dir.path().join("out").join("brief.html")).unwrap();
        assert!(page.contains("<title>brief</title>"));
        assert!(page.contains(r#"<h1 id="brief">Brief</h1>"#));
    }

    #[tokio::test]
    async fn test_export_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.md");
        std::fs::write(&source, "# Notes\n\nSome text.").unwrap();

        let export = Export {
            format: ExportFormat::Pdf,
            name: Some("custom.pdf".into()),
            output_dir: Some(dir.path().to_path_buf()),
            title: None,
            source_format: None,
            input: Input {
                input: Some(source),
            },
        };
        export.run(&Config::default()).await.unwrap();

        let bytes = std::fs::read(dir.path().join("custom.pdf")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
