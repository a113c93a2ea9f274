//! 组卷流程 - 流程层
//!
//! 核心职责：定义"一张试卷"的完整生成流程
//!
//! 流程顺序：
//! 1. 根据输出路径选择渲染器（不支持的格式在抽题之前报错）
//! 2. 配额校验 → 专题抽题 → 通用候选池补齐
//! 3. 按分值分组 → 渲染文档
//! 4. 图片缺失写入 warn.txt（兜底，不中断）

use std::collections::BTreeMap;
use std::path::PathBuf;

use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::input::PaperRequest;
use crate::models::{MarkValue, QuestionBank};
use crate::render::{renderer_for, AssetResolver, PaperDocument};
use crate::services::{QuotaReconciler, WarnWriter};
use crate::utils::logging::log_quota;

/// 一张试卷的生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperOutcome {
    pub output: PathBuf,
    pub questions_by_marks: BTreeMap<MarkValue, usize>,
    pub total_questions: usize,
    pub missing_assets: usize,
}

/// 组卷流程
///
/// - 不持有题库，题库由调用方传入，失败后可直接用新配额重试
/// - 只依赖业务能力（services）和渲染器
pub struct PaperFlow {
    excluded_topic: Option<String>,
    paper_title: String,
    assets: AssetResolver,
    warn_writer: WarnWriter,
}

impl PaperFlow {
    /// 创建新的组卷流程
    pub fn new(config: &Config) -> Self {
        Self {
            excluded_topic: config.excluded_topic.clone(),
            paper_title: config.paper_title.clone(),
            assets: AssetResolver::new(config.resolved_asset_root()),
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
        }
    }

    pub fn run<R>(
        &self,
        bank: &QuestionBank,
        request: &PaperRequest,
        rng: &mut R,
    ) -> AppResult<PaperOutcome>
    where
        R: Rng + ?Sized,
    {
        request.quota.validate()?;
        log_quota(&request.quota);

        let renderer = renderer_for(&request.output, self.assets.clone())?;

        // ========== 抽题 ==========
        let selection = QuotaReconciler::new(bank)
            .with_excluded_topic(self.excluded_topic.clone())
            .reconcile(&request.quota, rng)?;

        // ========== 渲染 ==========
        let paper = PaperDocument::new(self.paper_title.as_str(), &selection);
        info!("📝 正在生成试卷: {}", request.output.display());
        let report = renderer.render(&paper, &request.output)?;

        // ========== 兜底：图片缺失写入 warn.txt ==========
        for missing in &report.missing_assets {
            if let Err(e) = self.warn_writer.write(&request.output, missing) {
                warn!("⚠️ 写入警告文件失败: {}", e);
            }
        }
        if !report.missing_assets.is_empty() {
            warn!(
                "⚠️ {} 张图片缺失，已用占位内容代替并写入警告文件",
                report.missing_assets.len()
            );
        }

        info!("✓ 试卷已生成: {}", report.output.display());

        Ok(PaperOutcome {
            output: report.output,
            questions_by_marks: paper
                .sections
                .iter()
                .map(|(&marks, questions)| (marks, questions.len()))
                .collect(),
            total_questions: report.questions_written,
            missing_assets: report.missing_assets.len(),
        })
    }
}
