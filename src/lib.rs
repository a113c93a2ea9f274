//! # Question Paper Generator
//!
//! 按分值和专题配额从题库中随机抽题，生成试卷文档
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 题目记录、题库、配额，以及题库文件解析（分隔文本 / CSV）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `select` - 从单个候选池抽 n 道题（不足时有放回补齐）
//! - `QuotaReconciler` - 专题配额 + 通用候选池补齐
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 渲染层（Render）
//! - `render/` - 按分值分节输出 Word / Markdown / TOML 试卷
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一张试卷"的完整生成流程
//! - `PaperFlow` - 流程编排（校验 → 抽题 → 渲染 → warn）
//!
//! ### ⑤ 应用层
//! - `input/` - 配额文件与交互输入
//! - `App` - 加载题库、获取配额、运行流程、输出统计
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod logger;
pub mod models;
pub mod render;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use input::PaperRequest;
pub use models::{QuestionBank, QuestionRecord, Quota};
pub use render::{PaperDocument, PaperRenderer};
pub use services::{select, QuotaReconciler, SelectionResult};
pub use workflow::{PaperFlow, PaperOutcome};
