use std::collections::{BTreeMap, BTreeSet};

use super::question::{MarkValue, QuestionRecord};

/// 题库：专题 → 分值 → 题目列表
///
/// 加载时一次性构建，之后只读
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    topics: BTreeMap<String, BTreeMap<MarkValue, Vec<QuestionRecord>>>,
}

impl QuestionBank {
    /// 按记录顺序构建题库，同一专题同一分值下保持原有顺序
    pub fn from_records(records: impl IntoIterator<Item = QuestionRecord>) -> Self {
        let mut topics: BTreeMap<String, BTreeMap<MarkValue, Vec<QuestionRecord>>> =
            BTreeMap::new();
        for record in records {
            topics
                .entry(record.topic.clone())
                .or_default()
                .entry(record.marks)
                .or_default()
                .push(record);
        }
        Self { topics }
    }

    /// 所有专题名称（按字典序）
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// 某专题某分值下的题目；专题或分值不存在时返回空切片
    pub fn questions(&self, topic: &str, marks: MarkValue) -> &[QuestionRecord] {
        self.topics
            .get(topic)
            .and_then(|by_marks| by_marks.get(&marks))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 通用候选池：所有专题（排除 `excluded_topic`）中该分值的题目
    pub fn pool_for_marks(
        &self,
        marks: MarkValue,
        excluded_topic: Option<&str>,
    ) -> Vec<&QuestionRecord> {
        self.topics
            .iter()
            .filter(|(topic, _)| Some(topic.as_str()) != excluded_topic)
            .filter_map(|(_, by_marks)| by_marks.get(&marks))
            .flatten()
            .collect()
    }

    /// 题库中出现过的全部分值
    pub fn mark_values(&self) -> BTreeSet<MarkValue> {
        self.topics
            .values()
            .flat_map(|by_marks| by_marks.keys().copied())
            .collect()
    }

    /// 每个分值的题目数量
    pub fn count_by_marks(&self) -> BTreeMap<MarkValue, usize> {
        let mut counts = BTreeMap::new();
        for by_marks in self.topics.values() {
            for (marks, questions) in by_marks {
                *counts.entry(*marks).or_insert(0) += questions.len();
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.topics
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bank() -> QuestionBank {
        QuestionBank::from_records(vec![
            QuestionRecord::new("Current Electricity", "Define current.", 1),
            QuestionRecord::new("Current Electricity", "State Ohm's law.", 2),
            QuestionRecord::new("Optics", "Define focal length.", 1),
            QuestionRecord::new("Optics", "What is a prism?", 1),
            QuestionRecord::new("Magnetism", "Explain hysteresis.", 5),
        ])
    }

    #[test]
    fn test_groups_by_topic_and_marks() {
        let bank = sample_bank();
        assert_eq!(bank.len(), 5);
        assert_eq!(
            bank.topics().collect::<Vec<_>>(),
            vec!["Current Electricity", "Magnetism", "Optics"]
        );
        assert_eq!(bank.questions("Optics", 1).len(), 2);
        assert_eq!(bank.questions("Optics", 1)[0].text, "Define focal length.");
        assert!(bank.questions("Optics", 5).is_empty());
        assert!(bank.questions("Thermodynamics", 1).is_empty());
    }

    #[test]
    fn test_pool_excludes_topic() {
        let bank = sample_bank();
        assert_eq!(bank.pool_for_marks(1, None).len(), 3);

        let pool = bank.pool_for_marks(1, Some("Current Electricity"));
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|q| q.topic == "Optics"));
    }

    #[test]
    fn test_counts() {
        let bank = sample_bank();
        let counts = bank.count_by_marks();
        assert_eq!(counts.get(&1), Some(&3));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&5), Some(&1));
        assert_eq!(bank.mark_values().into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);
        assert!(QuestionBank::default().is_empty());
    }
}
