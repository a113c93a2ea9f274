//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;

use crate::config::Config;
use crate::models::{QuestionBank, Quota};
use crate::workflow::PaperOutcome;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n组卷日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 在日志文件末尾追加一份试卷的生成记录
pub fn append_paper_log(log_file_path: &str, outcome: &PaperOutcome) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;

    let per_marks = outcome
        .questions_by_marks
        .iter()
        .map(|(marks, count)| format!("{} 分 × {}", marks, count))
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(
        file,
        "[{}] 试卷: {} | 题目: {} ({}) | 图片缺失: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        outcome.output.display(),
        outcome.total_questions,
        per_marks,
        outcome.missing_assets
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 随机组卷");
    info!("📚 题库文件: {}", config.question_bank_path.display());
    match &config.excluded_topic {
        Some(topic) => info!("🚫 通用候选池排除专题: {}", topic),
        None => info!("🚫 通用候选池不排除任何专题"),
    }
    if let Some(seed) = config.rng_seed {
        info!("🎲 随机种子: {}", seed);
    }
    info!("{}", "=".repeat(60));
}

/// 记录题库加载信息
pub fn log_bank_loaded(bank: &QuestionBank) {
    info!("✓ 题库共 {} 道题目，{} 个专题", bank.len(), bank.topics().count());
    for (marks, count) in bank.count_by_marks() {
        info!("  {} 分题: {} 道", marks, count);
    }
}

/// 记录本次组卷配额
pub fn log_quota(quota: &Quota) {
    if let Some(total) = quota.total_questions() {
        info!("📋 组卷配额: 共 {} 道题目", total);
    }
    for (marks, total) in quota.totals() {
        info!("  {} 分题: {} 道 (专题指定 {} 道)", marks, total, quota.topic_sum(*marks));
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `outcome`: 组卷结果
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(outcome: &PaperOutcome, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 组卷完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 输出文件: {}", outcome.output.display());
    for (marks, count) in &outcome.questions_by_marks {
        info!("  {} 分题: {} 道", marks, count);
    }
    info!("✅ 题目总数: {}", outcome.total_questions);
    if outcome.missing_assets > 0 {
        info!("⚠️ 图片缺失: {}", outcome.missing_assets);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
