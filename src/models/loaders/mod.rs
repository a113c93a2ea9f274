pub mod delimited_loader;
pub mod tabular_loader;

pub use delimited_loader::parse_delimited;
pub use tabular_loader::parse_tabular;

use std::fs::{self, File};
use std::path::Path;

use crate::error::LoadError;
use crate::models::bank::QuestionBank;
use crate::models::question::{MarkValue, QuestionRecord};
use crate::utils::text::decode_unicode_escapes;

/// 题库文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    /// 每行一条记录，字段以分隔符分开
    Delimited(char),
    /// 带表头的表格（CSV / TSV）
    Tabular(u8),
}

impl BankFormat {
    /// 按扩展名判断格式：`.csv` / `.tsv` 为表格，其余按分隔文本处理
    pub fn detect(path: &Path, delimiter: char) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => BankFormat::Tabular(b','),
            Some("tsv") => BankFormat::Tabular(b'\t'),
            _ => BankFormat::Delimited(delimiter),
        }
    }
}

/// 从文件加载题库，任何一行格式错误都会使整个加载失败
pub fn load_question_bank(path: &Path, delimiter: char) -> Result<QuestionBank, LoadError> {
    tracing::info!("正在加载题库: {}", path.display());

    let records = match BankFormat::detect(path, delimiter) {
        BankFormat::Delimited(delimiter) => {
            let content = fs::read_to_string(path).map_err(|source| LoadError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
            parse_delimited(&content, delimiter)?
        }
        BankFormat::Tabular(delimiter) => {
            let file = File::open(path).map_err(|source| LoadError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
            parse_tabular(file, delimiter)?
        }
    };

    tracing::info!("成功加载 {} 道题目", records.len());
    Ok(QuestionBank::from_records(records))
}

/// 两种格式共用的字段校验
pub(crate) struct RawFields<'a> {
    pub row: usize,
    pub topic: &'a str,
    pub text: &'a str,
    pub marks: &'a str,
    pub image_path: Option<&'a str>,
    pub options: Vec<&'a str>,
}

impl RawFields<'_> {
    pub(crate) fn into_record(self) -> Result<QuestionRecord, LoadError> {
        let topic = self.topic.trim();
        if topic.is_empty() {
            return Err(LoadError::malformed(self.row, "专题为空"));
        }

        let text = self.text.trim();
        if text.is_empty() {
            return Err(LoadError::malformed(self.row, "题干为空"));
        }

        let marks_field = self.marks.trim();
        let marks: MarkValue = marks_field.parse().map_err(|_| {
            LoadError::malformed(self.row, format!("分值 '{}' 不是有效的整数", marks_field))
        })?;

        let image_path = self
            .image_path
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(str::to_string);

        let options = self
            .options
            .into_iter()
            .map(str::trim)
            .filter(|option| !option.is_empty())
            .map(|option| decode_unicode_escapes(option).into_owned())
            .collect();

        Ok(QuestionRecord {
            topic: topic.to_string(),
            text: decode_unicode_escapes(text).into_owned(),
            image_path,
            options,
            marks,
        })
    }
}
