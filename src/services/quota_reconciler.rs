//! 配额协调服务 - 业务能力层
//!
//! 把"每个分值的总数 + 每个专题的指定数量"转换为一系列抽题调用

use std::collections::BTreeMap;

use rand::Rng;
use tracing::{debug, info};

use crate::error::{AppResult, SelectionError};
use crate::models::{MarkValue, QuestionBank, QuestionRecord, Quota};
use crate::services::selector::{select, EmptyPool};

/// 一次组卷抽出的题目，按抽取顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    questions: Vec<QuestionRecord>,
}

impl SelectionResult {
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 某分值已抽出的数量
    pub fn count_marks(&self, marks: MarkValue) -> usize {
        self.questions.iter().filter(|q| q.marks == marks).count()
    }

    /// 按分值分组（分值升序），组内保持抽取顺序
    pub fn group_by_marks(&self) -> BTreeMap<MarkValue, Vec<QuestionRecord>> {
        self.questions
            .iter()
            .fold(BTreeMap::new(), |mut groups, question| {
                groups
                    .entry(question.marks)
                    .or_insert_with(Vec::new)
                    .push(question.clone());
                groups
            })
    }

    pub fn into_questions(self) -> Vec<QuestionRecord> {
        self.questions
    }
}

/// 配额协调器
///
/// 1. 先按专题配额从对应专题抽题
/// 2. 计算每个分值还差多少道
/// 3. 从所有专题（排除 `excluded_topic`）合并的候选池中补齐
pub struct QuotaReconciler<'a> {
    bank: &'a QuestionBank,
    excluded_topic: Option<String>,
}

impl<'a> QuotaReconciler<'a> {
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self {
            bank,
            excluded_topic: None,
        }
    }

    /// 设置通用候选池中排除的专题
    pub fn with_excluded_topic(mut self, topic: Option<String>) -> Self {
        self.excluded_topic = topic;
        self
    }

    /// 按配额抽题
    ///
    /// 配额不合法时在任何抽题之前返回错误；候选池为空时返回 [`SelectionError::EmptyPool`]
    pub fn reconcile<R>(&self, quota: &Quota, rng: &mut R) -> AppResult<SelectionResult>
    where
        R: Rng + ?Sized,
    {
        quota.validate()?;

        let mut selected: Vec<QuestionRecord> = Vec::new();

        // ========== 专题指定部分 ==========
        for (topic, by_marks) in quota.per_topic() {
            for (&marks, &count) in by_marks {
                let pool = self.bank.questions(topic, marks);
                let drawn = select(pool, count, rng).map_err(|e| empty_pool(marks, Some(topic), e))?;
                if count > 0 {
                    debug!("专题 '{}' 抽取 {} 分题 {} 道 (候选 {} 道)", topic, marks, count, pool.len());
                }
                selected.extend(drawn);
            }
        }

        // ========== 通用候选池补齐 ==========
        for (&marks, &total) in quota.totals() {
            let already = selected.iter().filter(|q| q.marks == marks).count();
            let remaining = total.saturating_sub(already);
            if remaining == 0 {
                continue;
            }

            let pool = self
                .bank
                .pool_for_marks(marks, self.excluded_topic.as_deref());
            let drawn = select(&pool, remaining, rng).map_err(|e| empty_pool(marks, None, e))?;
            debug!("通用候选池抽取 {} 分题 {} 道 (候选 {} 道)", marks, remaining, pool.len());
            selected.extend(drawn.into_iter().cloned());
        }

        info!("✓ 共抽取 {} 道题目", selected.len());
        Ok(SelectionResult {
            questions: selected,
        })
    }
}

fn empty_pool(marks: MarkValue, topic: Option<&str>, err: EmptyPool) -> SelectionError {
    SelectionError::EmptyPool {
        marks,
        requested: err.requested,
        topic: topic.map(str::to_string),
    }
}
