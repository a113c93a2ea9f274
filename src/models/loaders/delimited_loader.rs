use super::RawFields;
use crate::error::LoadError;
use crate::models::question::QuestionRecord;

/// 解析分隔文本格式的题库
///
/// 每行一条记录：`专题|题干|分值|图片路径|选项1|选项2|…`，图片路径及之后的字段可省略。
/// 空行跳过，行号从 1 开始计。
pub fn parse_delimited(content: &str, delimiter: char) -> Result<Vec<QuestionRecord>, LoadError> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let row = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(delimiter).collect();
        if parts.len() < 3 {
            return Err(LoadError::malformed(
                row,
                format!("至少需要 3 个字段 (专题、题干、分值)，实际 {} 个", parts.len()),
            ));
        }

        let record = RawFields {
            row,
            topic: parts[0],
            text: parts[1],
            marks: parts[2],
            image_path: parts.get(3).copied(),
            options: parts.iter().skip(4).copied().collect(),
        }
        .into_record()?;

        tracing::debug!("第 {} 行: [{}] {} 分", row, record.topic, record.marks);
        records.push(record);
    }

    Ok(records)
}
