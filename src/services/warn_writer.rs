//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::AssetMissingError;

/// 警告写入服务
///
/// 职责：
/// - 将渲染时缺失的图片资源追加写入 warn.txt
/// - 每次只处理一条警告
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入一条图片缺失警告
    ///
    /// # 参数
    /// - `output`: 正在生成的试卷路径
    /// - `missing`: 缺失的资源
    pub fn write(&self, output: &Path, missing: &AssetMissingError) -> Result<()> {
        debug!("写入警告: 试卷 {} | 图片 {}", output.display(), missing.path.display());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        let warn_msg = format!(
            "{} | 试卷 {} | 图片缺失 {} | 题干: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            output.display(),
            missing.path.display(),
            missing.question
        );

        file.write_all(warn_msg.as_bytes())?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
