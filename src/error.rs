use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题库加载错误
    #[error("题库加载错误: {0}")]
    Load(#[from] LoadError),
    /// 配额错误
    #[error("配额错误: {0}")]
    Quota(#[from] QuotaError),
    /// 抽题错误
    #[error("抽题错误: {0}")]
    Selection(#[from] SelectionError),
    /// 渲染错误
    #[error("渲染错误: {0}")]
    Render(#[from] RenderError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 是否可以调整配额后重试（题库保持不变）
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Quota(_) | AppError::Selection(_))
    }
}

/// 题库加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    /// 题库文件读取失败
    #[error("读取题库文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 某一行记录格式错误，整个加载失败
    #[error("第 {row} 行记录格式错误: {reason}")]
    MalformedRecord { row: usize, reason: String },
}

/// 配额错误，在抽题开始之前检出
#[derive(Debug, Error)]
pub enum QuotaError {
    /// 数量为负
    #[error("{}{marks} 分题目数量不能为负数: {count}", topic_label(.topic))]
    NegativeCount {
        marks: u32,
        topic: Option<String>,
        count: i64,
    },
    /// 分值键无法解析
    #[error("无效的分值: '{key}'")]
    InvalidMarkValue { key: String },
    /// 各专题指定数量之和超过该分值的总数
    #[error("{marks} 分题目: 各专题指定数量之和 {topic_sum} 超过总数 {total}")]
    TopicSumExceedsTotal {
        marks: u32,
        topic_sum: usize,
        total: usize,
    },
    /// 单项数量超过上限
    #[error("{}{marks} 分题目数量 {count} 超过上限 {max}", topic_label(.topic))]
    CountTooLarge {
        marks: u32,
        topic: Option<String>,
        count: u64,
        max: usize,
    },
    /// 整张试卷题目总数超过上限
    #[error("试卷题目总数超过上限 {max}")]
    PaperTooLarge { max: usize },
}

/// 抽题错误
#[derive(Debug, Error)]
pub enum SelectionError {
    /// 候选池为空，但仍需要抽题
    #[error(
        "没有足够的 {marks} 分题目可用{}: 需要 {requested} 道，候选池为空",
        topic_suffix(.topic)
    )]
    EmptyPool {
        marks: u32,
        requested: usize,
        topic: Option<String>,
    },
}

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    /// 不支持的输出格式
    #[error("不支持的输出格式: {} (支持 .docx / .md / .markdown / .txt / .toml)", .path.display())]
    UnsupportedFormat { path: PathBuf },
    /// 写入文档失败
    #[error("写入文档失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 读取已生成的文档失败
    #[error("读取文档失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Word 文档打包或解析失败
    #[error("Word 文档处理失败 ({}): {reason}", .path.display())]
    Docx { path: PathBuf, reason: String },
    /// TOML 序列化失败
    #[error("TOML 序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// TOML 文档解析失败
    #[error("TOML 文档解析失败: {0}")]
    Deserialize(#[from] toml::de::Error),
}

/// 图片资源缺失（非致命，渲染继续）
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("图片资源缺失: {} (题目: {question})", .path.display())]
pub struct AssetMissingError {
    pub path: PathBuf,
    pub question: String,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配额文件读取或解析失败
    #[error("配额文件解析失败 ({}): {reason}", .path.display())]
    QuotaFileInvalid { path: PathBuf, reason: String },
    /// 交互输入失败
    #[error("读取输入失败: {0}")]
    InputFailed(#[from] std::io::Error),
}

fn topic_label(topic: &Option<String>) -> String {
    topic
        .as_deref()
        .map(|t| format!("专题 '{}' 的 ", t))
        .unwrap_or_default()
}

fn topic_suffix(topic: &Option<String>) -> String {
    topic
        .as_deref()
        .map(|t| format!(" (专题: {})", t))
        .unwrap_or_default()
}

// ========== 便捷构造函数 ==========

impl LoadError {
    /// 创建记录格式错误
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        LoadError::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

impl ConfigError {
    /// 创建环境变量解析错误
    pub fn env_parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        }
    }

    /// 创建配额文件错误
    pub fn quota_file_invalid(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConfigError::QuotaFileInvalid {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_message_names_mark_and_topic() {
        let generic = SelectionError::EmptyPool {
            marks: 3,
            requested: 2,
            topic: None,
        };
        assert!(generic.to_string().contains("3 分"));

        let specific = SelectionError::EmptyPool {
            marks: 1,
            requested: 1,
            topic: Some("Optics".to_string()),
        };
        let msg = specific.to_string();
        assert!(msg.contains("1 分"));
        assert!(msg.contains("Optics"));
    }

    #[test]
    fn test_retryable_errors() {
        let quota: AppError = QuotaError::InvalidMarkValue {
            key: "x".to_string(),
        }
        .into();
        assert!(quota.is_retryable());

        let too_large: AppError = QuotaError::PaperTooLarge { max: 10 }.into();
        assert!(too_large.is_retryable());

        let load: AppError = LoadError::malformed(4, "缺少分值").into();
        assert!(!load.is_retryable());
        assert!(load.to_string().contains("第 4 行"));
    }
}
