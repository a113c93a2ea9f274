//! 组卷请求输入
//!
//! 两种来源：配额文件（非交互）和命令行交互输入

pub mod prompt;
pub mod quota_file;

pub use prompt::{ask_retry, prompt_paper_request};
pub use quota_file::load_quota_file;

use std::path::PathBuf;

use crate::models::Quota;

/// 一次组卷请求：配额 + 输出路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRequest {
    pub quota: Quota,
    pub output: PathBuf,
}
