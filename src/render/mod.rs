//! 试卷渲染
//!
//! 把抽出的题目按分值分节写成文档。支持的输出格式由输出文件扩展名决定：
//! - `.docx` → [`DocxRenderer`]
//! - `.md` / `.markdown` / `.txt` → [`MarkdownRenderer`]
//! - `.toml` → [`TomlRenderer`]
//!
//! 图片缺失不会中断渲染：写入占位内容并记录在 [`RenderReport::missing_assets`] 中。

pub mod docx;
pub mod markdown;
pub mod toml_paper;

pub use docx::DocxRenderer;
pub use markdown::MarkdownRenderer;
pub use toml_paper::TomlRenderer;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AssetMissingError, RenderError};
use crate::models::{MarkValue, QuestionRecord};
use crate::services::SelectionResult;
use crate::utils::text::truncate_text;

/// 待渲染的试卷：标题 + 按分值升序排列的分节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperDocument {
    pub title: String,
    pub sections: BTreeMap<MarkValue, Vec<QuestionRecord>>,
}

impl PaperDocument {
    pub fn new(title: impl Into<String>, selection: &SelectionResult) -> Self {
        Self {
            title: title.into(),
            sections: selection.group_by_marks(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }
}

/// 一次渲染的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub output: PathBuf,
    pub questions_written: usize,
    pub missing_assets: Vec<AssetMissingError>,
}

/// 试卷渲染器
pub trait PaperRenderer {
    /// 写出文档；图片缺失记录在报告中，不作为错误返回
    fn render(&self, paper: &PaperDocument, output: &Path) -> Result<RenderReport, RenderError>;

    /// 重新读取已生成的文档并统计题目数量
    fn count_questions(&self, rendered: &Path) -> Result<usize, RenderError>;
}

/// 根据输出路径的扩展名选择渲染器
pub fn renderer_for(
    output: &Path,
    assets: AssetResolver,
) -> Result<Box<dyn PaperRenderer>, RenderError> {
    let extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("docx") => Ok(Box::new(DocxRenderer::new(assets))),
        Some("md") | Some("markdown") | Some("txt") => Ok(Box::new(MarkdownRenderer::new(assets))),
        Some("toml") => Ok(Box::new(TomlRenderer::new(assets))),
        _ => Err(RenderError::UnsupportedFormat {
            path: output.to_path_buf(),
        }),
    }
}

/// 分节标题，如 `1-Mark Questions`
pub fn section_heading(marks: MarkValue) -> String {
    format!("{}-Mark Questions", marks)
}

/// 把多行内容压成一行，保证每道题、每个选项只占一行
pub fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 图片路径解析：相对路径基于 `root`（一般是题库文件所在目录）
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
    root: Option<PathBuf>,
}

impl AssetResolver {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn resolve(&self, image_path: &str, question_text: &str) -> Result<PathBuf, AssetMissingError> {
        let candidate = Path::new(image_path);
        let resolved = match &self.root {
            Some(root) if candidate.is_relative() => root.join(candidate),
            _ => candidate.to_path_buf(),
        };

        if resolved.is_file() {
            Ok(resolved)
        } else {
            Err(AssetMissingError {
                path: resolved,
                question: truncate_text(question_text, 40),
            })
        }
    }
}

pub(crate) fn write_document(output: &Path, content: impl AsRef<[u8]>) -> Result<(), RenderError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::WriteFailed {
            path: output.to_path_buf(),
            source,
        })?;
    }
    fs::write(output, content).map_err(|source| RenderError::WriteFailed {
        path: output.to_path_buf(),
        source,
    })
}

pub(crate) fn read_document_bytes(rendered: &Path) -> Result<Vec<u8>, RenderError> {
    fs::read(rendered).map_err(|source| RenderError::ReadFailed {
        path: rendered.to_path_buf(),
        source,
    })
}

pub(crate) fn read_document(rendered: &Path) -> Result<String, RenderError> {
    fs::read_to_string(rendered).map_err(|source| RenderError::ReadFailed {
        path: rendered.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_for_extension() {
        let assets = AssetResolver::default();
        assert!(renderer_for(Path::new("paper.md"), assets.clone()).is_ok());
        assert!(renderer_for(Path::new("paper.TOML"), assets.clone()).is_ok());
        assert!(renderer_for(Path::new("Question_Paper.docx"), assets.clone()).is_ok());
        assert!(matches!(
            renderer_for(Path::new("Question_Paper.pdf"), assets),
            Err(RenderError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_asset_resolver() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("circuit.png"), b"png").unwrap();

        let resolver = AssetResolver::new(Some(dir.path().to_path_buf()));
        assert_eq!(
            resolver.resolve("circuit.png", "Find the current.").unwrap(),
            dir.path().join("circuit.png")
        );

        let missing = resolver.resolve("lens.png", "Draw the ray diagram.").unwrap_err();
        assert_eq!(missing.path, dir.path().join("lens.png"));
        assert_eq!(missing.question, "Draw the ray diagram.");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("alpha\nQuestion 9: beta"), "alpha Question 9: beta");
        assert_eq!(single_line("  one\r\n\n two "), "one two");
        assert_eq!(single_line("plain"), "plain");
    }

    #[test]
    fn test_section_heading() {
        assert_eq!(section_heading(5), "5-Mark Questions");
    }
}
