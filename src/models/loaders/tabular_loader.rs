use std::io::Read;

use serde::Deserialize;

use super::RawFields;
use crate::error::LoadError;
use crate::models::question::QuestionRecord;

/// `Options` 列内多个选项之间的分隔符
const OPTION_SEPARATOR: char = ';';

/// 表格中的一行，按表头列名取值
#[derive(Debug, Deserialize)]
struct TabularRow {
    #[serde(rename = "Topic")]
    topic: String,
    #[serde(rename = "QuestionText")]
    question_text: String,
    #[serde(rename = "Marks")]
    marks: String,
    #[serde(rename = "ImagePath", default)]
    image_path: Option<String>,
    #[serde(rename = "Options", default)]
    options: Option<String>,
}

/// 解析带表头的表格题库（列：`Topic, QuestionText, Marks, ImagePath`，可选 `Options`）
///
/// 行号与文件行号一致，表头为第 1 行。
pub fn parse_tabular<R: Read>(reader: R, delimiter: u8) -> Result<Vec<QuestionRecord>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| LoadError::malformed(1, format!("无法读取表头: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let fallback_row = index + 2;
        let raw = result.map_err(|e| {
            let row = e
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(fallback_row);
            LoadError::malformed(row, e.to_string())
        })?;
        let row = raw
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(fallback_row);

        let parsed: TabularRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| LoadError::malformed(row, e.to_string()))?;

        let record = RawFields {
            row,
            topic: &parsed.topic,
            text: &parsed.question_text,
            marks: &parsed.marks,
            image_path: parsed.image_path.as_deref(),
            options: parsed
                .options
                .as_deref()
                .map(|options| options.split(OPTION_SEPARATOR).collect())
                .unwrap_or_default(),
        }
        .into_record()?;

        records.push(record);
    }

    Ok(records)
}
