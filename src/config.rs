use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::MarkValue;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 题库文件（`.csv` / `.tsv` 按表格解析，其余按分隔文本解析）
    pub question_bank_path: PathBuf,
    /// 分隔文本题库的字段分隔符
    pub bank_delimiter: char,
    /// 配额文件（`.toml` / `.json`），为空时交互输入
    pub quota_file: Option<PathBuf>,
    /// 默认输出路径
    pub output_path: PathBuf,
    /// 试卷标题
    pub paper_title: String,
    /// 通用候选池中排除的专题
    pub excluded_topic: Option<String>,
    /// 交互输入时依次询问的分值
    pub mark_values: Vec<MarkValue>,
    /// 图片相对路径的根目录，为空时使用题库文件所在目录
    pub asset_root: Option<PathBuf>,
    /// 随机种子，指定后结果可复现
    pub rng_seed: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 图片缺失警告文件
    pub warn_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_bank_path: PathBuf::from("question.txt"),
            bank_delimiter: '|',
            quota_file: None,
            output_path: PathBuf::from("Question_Paper.docx"),
            paper_title: "Question Paper".to_string(),
            excluded_topic: None,
            mark_values: vec![1, 2, 3, 5],
            asset_root: None,
            rng_seed: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            question_bank_path: non_empty("QUESTION_BANK_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.question_bank_path),
            // 分隔符可以是空格，不做 trim
            bank_delimiter: match lookup("BANK_DELIMITER").filter(|v| !v.is_empty()) {
                Some(value) => parse_delimiter(&value)?,
                None => default.bank_delimiter,
            },
            quota_file: non_empty("QUOTA_FILE").map(PathBuf::from),
            output_path: non_empty("OUTPUT_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.output_path),
            paper_title: non_empty("PAPER_TITLE").unwrap_or(default.paper_title),
            excluded_topic: non_empty("EXCLUDED_TOPIC").map(|v| v.trim().to_string()),
            mark_values: match non_empty("MARK_VALUES") {
                Some(value) => parse_mark_values(&value)?,
                None => default.mark_values,
            },
            asset_root: non_empty("ASSET_ROOT").map(PathBuf::from),
            rng_seed: parse_optional("RNG_SEED", non_empty("RNG_SEED"), "u64")?,
            verbose_logging: parse_optional("VERBOSE_LOGGING", non_empty("VERBOSE_LOGGING"), "bool")?
                .unwrap_or(default.verbose_logging),
            output_log_file: non_empty("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: non_empty("WARN_FILE").unwrap_or(default.warn_file),
        })
    }

    /// 图片根目录：显式配置优先，否则为题库文件所在目录
    pub fn resolved_asset_root(&self) -> Option<PathBuf> {
        self.asset_root.clone().or_else(|| {
            self.question_bank_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
        })
    }
}

fn parse_optional<T: FromStr>(
    var_name: &str,
    value: Option<String>,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::env_parse_failed(var_name, v.clone(), expected_type))
        })
        .transpose()
}

fn parse_delimiter(value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ if value == "\\t" => Ok('\t'),
        _ => Err(ConfigError::env_parse_failed("BANK_DELIMITER", value, "单个字符")),
    }
}

fn parse_mark_values(value: &str) -> Result<Vec<MarkValue>, ConfigError> {
    let mut marks = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let mark: MarkValue = part
            .parse()
            .map_err(|_| ConfigError::env_parse_failed("MARK_VALUES", value, "逗号分隔的整数列表"))?;
        if !marks.contains(&mark) {
            marks.push(mark);
        }
    }
    if marks.is_empty() {
        return Err(ConfigError::env_parse_failed("MARK_VALUES", value, "逗号分隔的整数列表"));
    }
    Ok(marks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.question_bank_path, PathBuf::from("question.txt"));
        assert_eq!(config.bank_delimiter, '|');
        assert_eq!(config.mark_values, vec![1, 2, 3, 5]);
        assert!(config.excluded_topic.is_none());
        assert!(config.quota_file.is_none());
        assert!(config.rng_seed.is_none());
        assert!(!config.verbose_logging);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("QUESTION_BANK_PATH", "bank/physics.csv"),
            ("BANK_DELIMITER", "\\t"),
            ("EXCLUDED_TOPIC", " Current Electricity "),
            ("MARK_VALUES", "1, 2, 4"),
            ("RNG_SEED", "42"),
            ("VERBOSE_LOGGING", "true"),
            ("OUTPUT_PATH", "out/paper.toml"),
        ]))
        .unwrap();

        assert_eq!(config.bank_delimiter, '\t');
        assert_eq!(config.excluded_topic.as_deref(), Some("Current Electricity"));
        assert_eq!(config.mark_values, vec![1, 2, 4]);
        assert_eq!(config.rng_seed, Some(42));
        assert!(config.verbose_logging);
        assert_eq!(config.resolved_asset_root(), Some(PathBuf::from("bank")));
    }

    #[test]
    fn test_space_delimiter() {
        let config = Config::from_lookup(lookup_from(&[("BANK_DELIMITER", " ")])).unwrap();
        assert_eq!(config.bank_delimiter, ' ');

        let config = Config::from_lookup(lookup_from(&[("BANK_DELIMITER", "")])).unwrap();
        assert_eq!(config.bank_delimiter, '|');
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("RNG_SEED", "abc")])).unwrap_err();
        assert!(err.to_string().contains("RNG_SEED"));

        let err = Config::from_lookup(lookup_from(&[("MARK_VALUES", "1,x")])).unwrap_err();
        assert!(err.to_string().contains("MARK_VALUES"));

        let err = Config::from_lookup(lookup_from(&[("BANK_DELIMITER", "||")])).unwrap_err();
        assert!(err.to_string().contains("BANK_DELIMITER"));
    }

    #[test]
    fn test_asset_root_defaults_to_bank_directory() {
        let config = Config::default();
        assert_eq!(config.resolved_asset_root(), None);

        let explicit = Config {
            asset_root: Some(PathBuf::from("images")),
            ..Config::default()
        };
        assert_eq!(explicit.resolved_asset_root(), Some(PathBuf::from("images")));
    }
}
