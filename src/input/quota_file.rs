use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::PaperRequest;
use crate::error::{AppResult, ConfigError};
use crate::models::{Quota, RawQuota};

/// 配额文件内容
///
/// ```toml
/// output = "paper.md"
///
/// [totals]
/// 1 = 4
/// 2 = 0
///
/// [topics."Current Electricity"]
/// 1 = 1
/// ```
#[derive(Debug, Deserialize)]
struct QuotaFile {
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    totals: BTreeMap<String, i64>,
    #[serde(default)]
    topics: BTreeMap<String, BTreeMap<String, i64>>,
}

/// 读取配额文件（`.json` 按 JSON 解析，其余按 TOML 解析）
///
/// 文件未指定 `output` 时使用 `default_output`
pub fn load_quota_file(path: &Path, default_output: &Path) -> AppResult<PaperRequest> {
    info!("📋 正在读取配额文件: {}", path.display());

    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::quota_file_invalid(path, e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let file: QuotaFile = if is_json {
        serde_json::from_str(&content).map_err(|e| ConfigError::quota_file_invalid(path, e))?
    } else {
        toml::from_str(&content).map_err(|e| ConfigError::quota_file_invalid(path, e))?
    };

    let quota = Quota::try_from(RawQuota {
        totals: file.totals,
        topics: file.topics,
    })?;

    Ok(PaperRequest {
        quota,
        output: file.output.unwrap_or_else(|| default_output.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, QuotaError};

    #[test]
    fn test_load_toml_quota() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.toml");
        fs::write(
            &path,
            r#"
output = "physics.md"

[totals]
1 = 4
2 = 0

[topics."Current Electricity"]
1 = 1
"#,
        )
        .unwrap();

        let request = load_quota_file(&path, Path::new("default.md")).unwrap();
        assert_eq!(request.output, PathBuf::from("physics.md"));
        assert_eq!(request.quota.total_for(1), 4);
        assert_eq!(request.quota.total_for(2), 0);
        assert_eq!(request.quota.per_topic()["Current Electricity"][&1], 1);
    }

    #[test]
    fn test_load_json_quota_with_default_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        fs::write(&path, r#"{"totals": {"3": 2}, "topics": {"Optics": {"3": 1}}}"#).unwrap();

        let request = load_quota_file(&path, Path::new("default.md")).unwrap();
        assert_eq!(request.output, PathBuf::from("default.md"));
        assert_eq!(request.quota.total_for(3), 2);
    }

    #[test]
    fn test_invalid_quota_file() {
        let dir = tempfile::tempdir().unwrap();

        let negative = dir.path().join("negative.toml");
        fs::write(&negative, "[totals]\n1 = -1\n").unwrap();
        assert!(matches!(
            load_quota_file(&negative, Path::new("p.md")),
            Err(AppError::Quota(QuotaError::NegativeCount { marks: 1, .. }))
        ));

        let exceeding = dir.path().join("exceeding.toml");
        fs::write(&exceeding, "[totals]\n1 = 1\n[topics.Optics]\n1 = 2\n").unwrap();
        assert!(matches!(
            load_quota_file(&exceeding, Path::new("p.md")),
            Err(AppError::Quota(QuotaError::TopicSumExceedsTotal { .. }))
        ));

        let huge = dir.path().join("huge.toml");
        fs::write(&huge, "[totals]\n1 = 9223372036854775807\n").unwrap();
        assert!(matches!(
            load_quota_file(&huge, Path::new("p.md")),
            Err(AppError::Quota(QuotaError::CountTooLarge { marks: 1, .. }))
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[totals\n").unwrap();
        assert!(matches!(
            load_quota_file(&broken, Path::new("p.md")),
            Err(AppError::Config(ConfigError::QuotaFileInvalid { .. }))
        ));

        assert!(matches!(
            load_quota_file(&dir.path().join("missing.toml"), Path::new("p.md")),
            Err(AppError::Config(ConfigError::QuotaFileInvalid { .. }))
        ));
    }
}
