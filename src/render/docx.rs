//! Word 试卷
//!
//! 版式：
//! - 标题居中，分值分节使用一级标题
//! - 1 分选择题的选项以项目符号列出（`A. ...`）
//! - 图片宽 4 英寸，按原图比例缩放
//! - 全文 Verdana 11 磅，四边页边距 1 英寸

use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use docx_rs::{
    read_docx, AbstractNumbering, AlignmentType, DocumentChild, Docx, IndentLevel, Level, LevelJc,
    LevelText, NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, ParagraphChild, Pic,
    Run, RunChild, RunFonts, SpecialIndentType, Start, Style, StyleType,
};
use regex::Regex;
use tracing::{debug, warn};

use super::{
    read_document_bytes, section_heading, single_line, write_document, AssetResolver,
    PaperDocument, PaperRenderer, RenderReport,
};
use crate::error::{AssetMissingError, RenderError};
use crate::utils::text::truncate_text;

static QUESTION_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Question \d+: ").expect("题目段落正则无效"));

const FONT: &str = "Verdana";
/// 半磅为单位
const FONT_SIZE: usize = 22;
/// 1 英寸 = 1440 twip
const MARGIN_TWIPS: i32 = 1440;
/// 4 英寸 = 4 × 914400 EMU
const IMAGE_WIDTH_EMU: u32 = 3_657_600;
const BULLET_NUMBERING: usize = 1;

pub struct DocxRenderer {
    assets: AssetResolver,
}

impl DocxRenderer {
    pub fn new(assets: AssetResolver) -> Self {
        Self { assets }
    }

    fn build(&self, paper: &PaperDocument, report: &mut RenderReport) -> Docx {
        let mut docx = base_document().add_paragraph(
            Paragraph::new()
                .style("Title")
                .align(AlignmentType::Center)
                .add_run(Run::new().add_text(single_line(&paper.title)).size(52).bold()),
        );

        for (&marks, questions) in &paper.sections {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .style("Heading1")
                    .add_run(Run::new().add_text(section_heading(marks)).size(32).bold()),
            );

            for (index, question) in questions.iter().enumerate() {
                let number = index + 1;
                docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(format!(
                    "Question {}: {}",
                    number,
                    single_line(&question.text)
                ))));

                if question.is_mcq() {
                    for option in question.lettered_options() {
                        docx = docx.add_paragraph(
                            Paragraph::new()
                                .style("ListBullet")
                                .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(0))
                                .add_run(Run::new().add_text(single_line(&option))),
                        );
                    }
                }

                if let Some(image_path) = &question.image_path {
                    match self.load_picture(image_path, &question.text) {
                        Ok(pic) => {
                            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic)));
                        }
                        Err(missing) => {
                            warn!("⚠️ {}", missing);
                            docx = docx.add_paragraph(Paragraph::new().add_run(
                                Run::new()
                                    .add_text(format!("[Image not available: {}]", single_line(image_path)))
                                    .italic(),
                            ));
                            report.missing_assets.push(missing);
                        }
                    }
                }

                report.questions_written += 1;
            }
        }

        docx
    }

    /// 读取并解码图片；文件不存在或无法解码都按图片缺失处理
    fn load_picture(&self, image_path: &str, question_text: &str) -> Result<Pic, AssetMissingError> {
        let resolved = self.assets.resolve(image_path, question_text)?;
        let unreadable = || AssetMissingError {
            path: resolved.clone(),
            question: truncate_text(question_text, 40),
        };

        let bytes = std::fs::read(&resolved).map_err(|_| unreadable())?;
        let image = image::load_from_memory(&bytes).map_err(|e| {
            debug!("图片解码失败 {}: {}", resolved.display(), e);
            unreadable()
        })?;

        let (width, height) = (image.width().max(1), image.height());
        let height_emu = (u64::from(IMAGE_WIDTH_EMU) * u64::from(height) / u64::from(width)) as u32;
        Ok(Pic::new(&bytes).size(IMAGE_WIDTH_EMU, height_emu))
    }
}

/// 默认字体、页边距、标题样式和项目符号编号
fn base_document() -> Docx {
    Docx::new()
        .default_fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT))
        .default_size(FONT_SIZE)
        .page_margin(
            PageMargin::new()
                .top(MARGIN_TWIPS)
                .bottom(MARGIN_TWIPS)
                .left(MARGIN_TWIPS)
                .right(MARGIN_TWIPS),
        )
        .add_style(Style::new("Title", StyleType::Paragraph).name("Title"))
        .add_style(Style::new("Heading1", StyleType::Paragraph).name("Heading 1"))
        .add_style(Style::new("ListBullet", StyleType::Paragraph).name("List Bullet"))
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_NUMBERING).add_level(
                Level::new(
                    0,
                    Start::new(1),
                    NumberFormat::new("bullet"),
                    LevelText::new("•"),
                    LevelJc::new("left"),
                )
                .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
            ),
        )
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
}

/// 依次取出文档中每个段落的文字
fn paragraph_texts(docx: &Docx) -> Vec<String> {
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(
                para.children
                    .iter()
                    .filter_map(|child| match child {
                        ParagraphChild::Run(run) => Some(run),
                        _ => None,
                    })
                    .flat_map(|run| run.children.iter())
                    .filter_map(|child| match child {
                        RunChild::Text(text) => Some(text.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect()
}

fn read_paper(rendered: &Path) -> Result<Docx, RenderError> {
    let bytes = read_document_bytes(rendered)?;
    read_docx(&bytes).map_err(|e| RenderError::Docx {
        path: rendered.to_path_buf(),
        reason: format!("{:?}", e),
    })
}

impl PaperRenderer for DocxRenderer {
    fn render(&self, paper: &PaperDocument, output: &Path) -> Result<RenderReport, RenderError> {
        let mut report = RenderReport {
            output: output.to_path_buf(),
            questions_written: 0,
            missing_assets: Vec::new(),
        };

        let mut buffer = Cursor::new(Vec::new());
        self.build(paper, &mut report)
            .build()
            .pack(&mut buffer)
            .map_err(|e| RenderError::Docx {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })?;
        write_document(output, buffer.into_inner())?;
        debug!("Word 文档已写入: {}", output.display());

        Ok(report)
    }

    fn count_questions(&self, rendered: &Path) -> Result<usize, RenderError> {
        let docx = read_paper(rendered)?;
        Ok(paragraph_texts(&docx)
            .iter()
            .filter(|text| QUESTION_PARAGRAPH.is_match(text))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionRecord;
    use std::collections::BTreeMap;
    use std::fs;

    fn sample_paper() -> PaperDocument {
        let mut sections = BTreeMap::new();
        sections.insert(
            1,
            vec![
                QuestionRecord::new("Optics", "Which lens converges light?", 1)
                    .with_options(["Convex", "Concave\nQuestion 7: trick"]),
                QuestionRecord::new("Optics", "Define power of a lens.", 1),
            ],
        );
        sections.insert(
            5,
            vec![
                QuestionRecord::new("Optics", "Draw a ray diagram.", 5).with_image("ray.png"),
                QuestionRecord::new("Current Electricity", "Explain the circuit.", 5)
                    .with_image("circuit.png"),
            ],
        );
        PaperDocument {
            title: "Question Paper".to_string(),
            sections,
        }
    }

    #[test]
    fn test_render_docx_layout() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(8, 4)
            .save(dir.path().join("circuit.png"))
            .unwrap();
        let output = dir.path().join("Question_Paper.docx");

        let renderer = DocxRenderer::new(AssetResolver::new(Some(dir.path().to_path_buf())));
        let report = renderer.render(&sample_paper(), &output).unwrap();

        assert_eq!(report.questions_written, 4);
        assert_eq!(report.missing_assets.len(), 1);
        assert_eq!(report.missing_assets[0].path, dir.path().join("ray.png"));

        let texts = paragraph_texts(&read_paper(&output).unwrap());
        assert_eq!(texts[0], "Question Paper");
        assert_eq!(texts[1], "1-Mark Questions");
        assert_eq!(texts[2], "Question 1: Which lens converges light?");
        assert_eq!(texts[3], "A. Convex");
        assert_eq!(texts[4], "B. Concave Question 7: trick");
        assert!(texts.contains(&"5-Mark Questions".to_string()));
        assert!(texts.contains(&"[Image not available: ray.png]".to_string()));
    }

    #[test]
    fn test_count_questions_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("paper.docx");
        let renderer = DocxRenderer::new(AssetResolver::default());
        let paper = sample_paper();

        renderer.render(&paper, &output).unwrap();
        assert_eq!(renderer.count_questions(&output).unwrap(), paper.question_count());
    }

    #[test]
    fn test_undecodable_image_is_reported_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("circuit.png"), b"not a png").unwrap();
        let output = dir.path().join("paper.docx");

        let renderer = DocxRenderer::new(AssetResolver::new(Some(dir.path().to_path_buf())));
        let report = renderer.render(&sample_paper(), &output).unwrap();

        assert_eq!(report.missing_assets.len(), 2);
        assert_eq!(renderer.count_questions(&output).unwrap(), 4);
    }

    #[test]
    fn test_unreadable_document() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("paper.docx");
        fs::write(&output, b"plain text").unwrap();

        let renderer = DocxRenderer::new(AssetResolver::default());
        assert!(matches!(
            renderer.count_questions(&output),
            Err(RenderError::Docx { .. })
        ));
    }
}
