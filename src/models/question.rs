use serde::{Deserialize, Serialize};

/// 分值（1 分、2 分、3 分、5 分……），同时作为试卷分节的键
pub type MarkValue = u32;

/// 只有该分值的题目按选择题输出选项
pub const MCQ_MARKS: MarkValue = 1;

/// 题库中的一道题目，解析后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 所属专题
    pub topic: String,
    /// 题干
    pub text: String,
    /// 配图路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// 选择题选项（按顺序对应 A、B、C……）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// 分值
    pub marks: MarkValue,
}

impl QuestionRecord {
    pub fn new(topic: impl Into<String>, text: impl Into<String>, marks: MarkValue) -> Self {
        Self {
            topic: topic.into(),
            text: text.into(),
            image_path: None,
            options: Vec::new(),
            marks,
        }
    }

    pub fn with_image(mut self, image_path: impl Into<String>) -> Self {
        self.image_path = Some(image_path.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// 是否按选择题输出（1 分题且带有选项）
    pub fn is_mcq(&self) -> bool {
        self.marks == MCQ_MARKS && !self.options.is_empty()
    }

    /// 带字母编号的选项，如 `A. 2Ω`
    pub fn lettered_options(&self) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}. {}", option_letter(i), option))
            .collect()
    }
}

/// 第 `index` 个选项的字母编号，超过 Z 之后继续按 AA、AB…… 编号
pub fn option_letter(index: usize) -> String {
    let mut n = index;
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}
