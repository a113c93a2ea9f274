use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::PaperRequest;
use crate::error::ConfigError;
use crate::models::{MarkValue, QuestionBank, Quota};
use crate::render::{renderer_for, AssetResolver};

/// 交互式输入组卷请求
///
/// 1. 依次输入每个分值的题目总数
/// 2. 对题库中的每个专题，输入每个分值需要从该专题抽取的数量（不超过剩余数量）
/// 3. 输入输出文件路径，直接回车使用默认值
///
/// 非整数、负数以及超过剩余数量的输入都会提示后重新输入
pub fn prompt_paper_request<R, W>(
    input: &mut R,
    out: &mut W,
    bank: &QuestionBank,
    mark_values: &[MarkValue],
    default_output: &Path,
) -> Result<PaperRequest, ConfigError>
where
    R: BufRead,
    W: Write,
{
    let mut quota = Quota::new();
    let mut remaining: BTreeMap<MarkValue, usize> = BTreeMap::new();

    for &marks in mark_values {
        let count = read_count(
            input,
            out,
            &format!("请输入 {} 分题目的总数: ", marks),
            None,
        )?;
        quota.set_total(marks, count);
        remaining.insert(marks, count);
    }

    for topic in bank.topics() {
        writeln!(out, "\n专题 '{}':", topic)?;
        for &marks in mark_values {
            let max = remaining.get(&marks).copied().unwrap_or(0);
            let count = read_count(
                input,
                out,
                &format!(
                    "请输入从专题 '{}' 抽取的 {} 分题目数量 (最多 {}): ",
                    topic, marks, max
                ),
                Some(max),
            )?;
            quota.set_topic(topic, marks, count);
            if let Some(left) = remaining.get_mut(&marks) {
                *left -= count;
            }
        }
    }

    let output = read_output_path(input, out, default_output)?;

    Ok(PaperRequest { quota, output })
}

/// 输入输出文件路径，扩展名不受支持时重新输入
fn read_output_path<R, W>(input: &mut R, out: &mut W, default_output: &Path) -> Result<PathBuf, ConfigError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(
            out,
            "请输入输出文件名 (例如 Question_Paper.docx，直接回车使用 {}): ",
            default_output.display()
        )?;
        out.flush()?;
        let answer = read_answer(input)?;
        let output = if answer.is_empty() {
            default_output.to_path_buf()
        } else {
            PathBuf::from(answer)
        };

        match renderer_for(&output, AssetResolver::default()) {
            Ok(_) => return Ok(output),
            Err(e) => writeln!(out, "错误: {}", e)?,
        }
    }
}

/// 询问是否调整配额后重试
pub fn ask_retry<R, W>(input: &mut R, out: &mut W) -> Result<bool, ConfigError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "是否调整配额后重试? (y/n): ")?;
        out.flush()?;
        match read_answer(input)?.to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "错误: 请输入 y 或 n")?,
        }
    }
}

fn read_count<R, W>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    max: Option<usize>,
) -> Result<usize, ConfigError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{}", prompt)?;
        out.flush()?;
        let answer = read_answer(input)?;

        let value: i64 = match answer.parse() {
            Ok(value) => value,
            Err(_) => {
                writeln!(out, "错误: 请输入有效的整数")?;
                continue;
            }
        };

        let count = match usize::try_from(value) {
            Ok(count) => count,
            Err(_) => {
                writeln!(out, "错误: 请输入非负数")?;
                continue;
            }
        };

        match max {
            Some(max) if count > max => {
                writeln!(out, "错误: 数量 {} 超过允许的最大值 ({})", count, max)?;
            }
            _ => return Ok(count),
        }
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String, ConfigError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ConfigError::InputFailed(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "输入已结束",
        )));
    }
    Ok(line.trim().to_string())
}
