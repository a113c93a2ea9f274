use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::{
    read_document, section_heading, single_line, write_document, AssetResolver, PaperDocument,
    PaperRenderer, RenderReport,
};
use crate::error::RenderError;

static QUESTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Question \d+: ").expect("题目行正则无效"));

/// Markdown 试卷
///
/// ```text
/// # Question Paper
///
/// ## 1-Mark Questions
///
/// Question 1: ...
///
/// - A. ...
/// ```
pub struct MarkdownRenderer {
    assets: AssetResolver,
}

impl MarkdownRenderer {
    pub fn new(assets: AssetResolver) -> Self {
        Self { assets }
    }

    fn build(&self, paper: &PaperDocument, report: &mut RenderReport) -> String {
        let mut doc = format!("# {}\n\n", single_line(&paper.title));

        for (&marks, questions) in &paper.sections {
            doc.push_str(&format!("## {}\n\n", section_heading(marks)));

            for (index, question) in questions.iter().enumerate() {
                let number = index + 1;
                doc.push_str(&format!("Question {}: {}\n\n", number, single_line(&question.text)));

                if question.is_mcq() {
                    for option in question.lettered_options() {
                        doc.push_str(&format!("- {}\n", single_line(&option)));
                    }
                    doc.push('\n');
                }

                if let Some(image_path) = &question.image_path {
                    match self.assets.resolve(image_path, &question.text) {
                        Ok(resolved) => {
                            doc.push_str(&format!("![Question {}]({})\n\n", number, resolved.display()));
                        }
                        Err(missing) => {
                            warn!("⚠️ {}", missing);
                            doc.push_str(&format!(
                                "> [Image not available: {}]\n\n",
                                single_line(image_path)
                            ));
                            report.missing_assets.push(missing);
                        }
                    }
                }

                report.questions_written += 1;
            }
        }

        doc
    }
}

impl PaperRenderer for MarkdownRenderer {
    fn render(&self, paper: &PaperDocument, output: &Path) -> Result<RenderReport, RenderError> {
        let mut report = RenderReport {
            output: output.to_path_buf(),
            questions_written: 0,
            missing_assets: Vec::new(),
        };

        let doc = self.build(paper, &mut report);
        write_document(output, &doc)?;
        debug!("Markdown 文档已写入: {}", output.display());

        Ok(report)
    }

    fn count_questions(&self, rendered: &Path) -> Result<usize, RenderError> {
        let content = read_document(rendered)?;
        Ok(QUESTION_LINE.find_iter(&content).count())
    }
}
