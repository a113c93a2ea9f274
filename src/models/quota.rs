use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::question::MarkValue;
use crate::error::QuotaError;

/// 单个分值（或单个专题的单个分值）以及整张试卷允许的最大题目数
pub const MAX_QUESTION_COUNT: usize = 10_000;

/// 组卷配额
///
/// - `totals`: 每个分值需要的题目总数
/// - `per_topic`: 每个专题、每个分值需要从该专题专门抽取的数量
///
/// 同一分值下各专题数量之和不能超过该分值的总数，见 [`Quota::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quota {
    totals: BTreeMap<MarkValue, usize>,
    per_topic: BTreeMap<String, BTreeMap<MarkValue, usize>>,
}

impl Quota {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_total(mut self, marks: MarkValue, count: usize) -> Self {
        self.set_total(marks, count);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>, marks: MarkValue, count: usize) -> Self {
        self.set_topic(topic, marks, count);
        self
    }

    pub fn set_total(&mut self, marks: MarkValue, count: usize) {
        self.totals.insert(marks, count);
    }

    pub fn set_topic(&mut self, topic: impl Into<String>, marks: MarkValue, count: usize) {
        self.per_topic
            .entry(topic.into())
            .or_default()
            .insert(marks, count);
    }

    pub fn totals(&self) -> &BTreeMap<MarkValue, usize> {
        &self.totals
    }

    pub fn per_topic(&self) -> &BTreeMap<String, BTreeMap<MarkValue, usize>> {
        &self.per_topic
    }

    /// 某分值的总数，未指定时为 0
    pub fn total_for(&self, marks: MarkValue) -> usize {
        self.totals.get(&marks).copied().unwrap_or(0)
    }

    /// 某分值下各专题指定数量之和
    pub fn topic_sum(&self, marks: MarkValue) -> usize {
        self.per_topic
            .values()
            .filter_map(|by_marks| by_marks.get(&marks))
            .sum()
    }

    /// 整张试卷的题目总数，溢出时返回 `None`
    pub fn total_questions(&self) -> Option<usize> {
        self.totals
            .values()
            .try_fold(0usize, |sum, &count| sum.checked_add(count))
    }

    /// 检查配额是否合法
    ///
    /// - 每一项数量不超过 [`MAX_QUESTION_COUNT`]
    /// - 整张试卷的题目总数不超过 [`MAX_QUESTION_COUNT`]
    /// - 各专题数量之和不超过分值总数
    pub fn validate(&self) -> Result<(), QuotaError> {
        for (&marks, &count) in &self.totals {
            check_limit(marks, None, count as u64)?;
        }
        for (topic, by_marks) in &self.per_topic {
            for (&marks, &count) in by_marks {
                check_limit(marks, Some(topic), count as u64)?;
            }
        }
        match self.total_questions() {
            Some(total) if total <= MAX_QUESTION_COUNT => {}
            _ => {
                return Err(QuotaError::PaperTooLarge {
                    max: MAX_QUESTION_COUNT,
                })
            }
        }

        let topic_marks = self
            .per_topic
            .values()
            .flat_map(|by_marks| by_marks.keys().copied());
        let mut checked = Vec::new();
        for marks in topic_marks {
            if checked.contains(&marks) {
                continue;
            }
            checked.push(marks);

            let topic_sum = self.topic_sum(marks);
            let total = self.total_for(marks);
            if topic_sum > total {
                return Err(QuotaError::TopicSumExceedsTotal {
                    marks,
                    topic_sum,
                    total,
                });
            }
        }
        Ok(())
    }
}

/// 未经校验的配额（来自配额文件），分值键为字符串，数量可能为负
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawQuota {
    #[serde(default)]
    pub totals: BTreeMap<String, i64>,
    #[serde(default)]
    pub topics: BTreeMap<String, BTreeMap<String, i64>>,
}

impl TryFrom<RawQuota> for Quota {
    type Error = QuotaError;

    fn try_from(raw: RawQuota) -> Result<Self, Self::Error> {
        let mut quota = Quota::new();
        for (key, count) in raw.totals {
            let marks = parse_mark_key(&key)?;
            quota.set_total(marks, checked_count(marks, None, count)?);
        }
        for (topic, by_marks) in raw.topics {
            for (key, count) in by_marks {
                let marks = parse_mark_key(&key)?;
                let count = checked_count(marks, Some(&topic), count)?;
                quota.set_topic(topic.clone(), marks, count);
            }
        }
        quota.validate()?;
        Ok(quota)
    }
}

/// 解析分值键，如 `"1"`、`" 5 "`
pub fn parse_mark_key(key: &str) -> Result<MarkValue, QuotaError> {
    key.trim()
        .parse::<MarkValue>()
        .map_err(|_| QuotaError::InvalidMarkValue {
            key: key.to_string(),
        })
}

fn checked_count(marks: MarkValue, topic: Option<&str>, count: i64) -> Result<usize, QuotaError> {
    let count = u64::try_from(count).map_err(|_| QuotaError::NegativeCount {
        marks,
        topic: topic.map(str::to_string),
        count,
    })?;
    check_limit(marks, topic, count)?;
    usize::try_from(count).map_err(|_| too_large(marks, topic, count))
}

fn check_limit(marks: MarkValue, topic: Option<&str>, count: u64) -> Result<(), QuotaError> {
    if count > MAX_QUESTION_COUNT as u64 {
        return Err(too_large(marks, topic, count));
    }
    Ok(())
}

fn too_large(marks: MarkValue, topic: Option<&str>, count: u64) -> QuotaError {
    QuotaError::CountTooLarge {
        marks,
        topic: topic.map(str::to_string),
        count,
        max: MAX_QUESTION_COUNT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_sum_within_total() {
        let quota = Quota::new()
            .with_total(1, 4)
            .with_topic("Current Electricity", 1, 1)
            .with_topic("Optics", 1, 3);
        assert_eq!(quota.topic_sum(1), 4);
        assert!(quota.validate().is_ok());
        assert_eq!(quota.total_questions(), Some(4));
    }

    #[test]
    fn test_topic_sum_exceeds_total() {
        let quota = Quota::new()
            .with_total(2, 1)
            .with_topic("Optics", 2, 1)
            .with_topic("Magnetism", 2, 1);
        match quota.validate() {
            Err(QuotaError::TopicSumExceedsTotal {
                marks,
                topic_sum,
                total,
            }) => {
                assert_eq!(marks, 2);
                assert_eq!(topic_sum, 2);
                assert_eq!(total, 1);
            }
            other => panic!("期望 TopicSumExceedsTotal，实际: {:?}", other),
        }
    }

    #[test]
    fn test_topic_count_for_missing_total_is_rejected() {
        let quota = Quota::new().with_topic("Optics", 3, 1);
        assert!(quota.validate().is_err());

        let zero = Quota::new().with_topic("Optics", 3, 0);
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_raw_quota_conversion() {
        let mut raw = RawQuota::default();
        raw.totals.insert("1".to_string(), 4);
        raw.totals.insert("2".to_string(), 0);
        raw.topics
            .entry("Optics".to_string())
            .or_default()
            .insert("1".to_string(), 2);

        let quota = Quota::try_from(raw).unwrap();
        assert_eq!(quota.total_for(1), 4);
        assert_eq!(quota.total_for(2), 0);
        assert_eq!(quota.per_topic()["Optics"][&1], 2);
    }

    #[test]
    fn test_raw_quota_rejects_negative_and_bad_keys() {
        let mut negative = RawQuota::default();
        negative
            .topics
            .entry("Optics".to_string())
            .or_default()
            .insert("1".to_string(), -2);
        match Quota::try_from(negative) {
            Err(QuotaError::NegativeCount { marks, topic, count }) => {
                assert_eq!(marks, 1);
                assert_eq!(topic.as_deref(), Some("Optics"));
                assert_eq!(count, -2);
            }
            other => panic!("期望 NegativeCount，实际: {:?}", other),
        }

        let mut bad_key = RawQuota::default();
        bad_key.totals.insert("one".to_string(), 1);
        assert!(matches!(
            Quota::try_from(bad_key),
            Err(QuotaError::InvalidMarkValue { .. })
        ));
    }

    #[test]
    fn test_oversized_counts_are_rejected() {
        let overflow = Quota::new().with_total(1, usize::MAX).with_total(2, 1);
        assert_eq!(overflow.total_questions(), None);
        assert!(matches!(
            overflow.validate(),
            Err(QuotaError::CountTooLarge { marks: 1, .. })
        ));

        let per_mark_ok = Quota::new()
            .with_total(1, MAX_QUESTION_COUNT)
            .with_total(2, 1);
        assert!(matches!(
            per_mark_ok.validate(),
            Err(QuotaError::PaperTooLarge { .. })
        ));

        let topic = Quota::new()
            .with_total(1, 1)
            .with_topic("Optics", 1, MAX_QUESTION_COUNT + 1);
        match topic.validate() {
            Err(QuotaError::CountTooLarge { topic, count, .. }) => {
                assert_eq!(topic.as_deref(), Some("Optics"));
                assert_eq!(count, MAX_QUESTION_COUNT as u64 + 1);
            }
            other => panic!("期望 CountTooLarge，实际: {:?}", other),
        }

        let mut raw = RawQuota::default();
        raw.totals.insert("1".to_string(), i64::MAX);
        assert!(matches!(
            Quota::try_from(raw),
            Err(QuotaError::CountTooLarge { .. })
        ));
    }
}
