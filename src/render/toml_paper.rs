use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{read_document, section_heading, write_document, AssetResolver, PaperDocument, PaperRenderer, RenderReport};
use crate::error::RenderError;
use crate::models::MarkValue;

/// TOML 结构化试卷，便于其他工具再加工
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlPaper {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<TomlSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlSection {
    pub marks: MarkValue,
    pub heading: String,
    #[serde(default)]
    pub questions: Vec<TomlQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlQuestion {
    pub number: usize,
    pub topic: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// 图片缺失时记录原始路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_image: Option<String>,
}

pub struct TomlRenderer {
    assets: AssetResolver,
}

impl TomlRenderer {
    pub fn new(assets: AssetResolver) -> Self {
        Self { assets }
    }

    fn build(&self, paper: &PaperDocument, report: &mut RenderReport) -> TomlPaper {
        let sections = paper
            .sections
            .iter()
            .map(|(&marks, questions)| TomlSection {
                marks,
                heading: section_heading(marks),
                questions: questions
                    .iter()
                    .enumerate()
                    .map(|(index, question)| {
                        let mut item = TomlQuestion {
                            number: index + 1,
                            topic: question.topic.clone(),
                            text: question.text.clone(),
                            options: if question.is_mcq() {
                                question.lettered_options()
                            } else {
                                Vec::new()
                            },
                            image: None,
                            missing_image: None,
                        };

                        if let Some(image_path) = &question.image_path {
                            match self.assets.resolve(image_path, &question.text) {
                                Ok(resolved) => item.image = Some(resolved.display().to_string()),
                                Err(missing) => {
                                    warn!("⚠️ {}", missing);
                                    item.missing_image = Some(image_path.clone());
                                    report.missing_assets.push(missing);
                                }
                            }
                        }

                        report.questions_written += 1;
                        item
                    })
                    .collect(),
            })
            .collect();

        TomlPaper {
            title: paper.title.clone(),
            sections,
        }
    }
}

impl PaperRenderer for TomlRenderer {
    fn render(&self, paper: &PaperDocument, output: &Path) -> Result<RenderReport, RenderError> {
        let mut report = RenderReport {
            output: output.to_path_buf(),
            questions_written: 0,
            missing_assets: Vec::new(),
        };

        let doc = self.build(paper, &mut report);
        let content = toml::to_string_pretty(&doc)?;
        write_document(output, &content)?;
        debug!("TOML 文档已写入: {}", output.display());

        Ok(report)
    }

    fn count_questions(&self, rendered: &Path) -> Result<usize, RenderError> {
        let content = read_document(rendered)?;
        let paper: TomlPaper = toml::from_str(&content)?;
        Ok(paper.sections.iter().map(|s| s.questions.len()).sum())
    }
}
