//! 扫描清单.

use crate::partition::{Group, SplitMode};
use serde::Deserialize;

/// 扫描清单. 只读输入.
///
/// 配置中既可以给出扁平的扫描名列表, 也可以给出按组预先分配好的列表:
///
/// ```json
/// "scans": ["100", "101", "102"]
/// "scans": {"train": ["100", "101"], "valid": ["102"], "test": ["144"]}
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScanManifest {
    /// 扁平列表. 全部扫描处理完后按样本划分.
    Flat(Vec<String>),

    /// 按扫描预先分组. 不调用划分器.
    Grouped {
        /// 训练集扫描.
        #[serde(default)]
        train: Vec<String>,

        /// 验证集扫描.
        #[serde(default)]
        valid: Vec<String>,

        /// 测试集扫描. 这些扫描的全部样本都会保留.
        #[serde(default)]
        test: Vec<String>,
    },
}

/// 清单中的单个扫描.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScanEntry<'a> {
    /// 扫描名, 同时也是扫描目录名和样本文件名前缀.
    pub name: &'a str,

    /// 预先分配的组. 扁平清单时为 `None`.
    pub group: Option<Group>,
}

impl ScanManifest {
    /// 清单对应的划分方式.
    #[inline]
    pub fn split_mode(&self) -> SplitMode {
        match self {
            ScanManifest::Grouped { .. } => SplitMode::ByScan,
            ScanManifest::Flat(_) => SplitMode::BySample,
        }
    }

    /// 扫描总数.
    pub fn len(&self) -> usize {
        match self {
            ScanManifest::Grouped { train, valid, test } => train.len() + valid.len() + test.len(),
            ScanManifest::Flat(v) => v.len(),
        }
    }

    /// 清单是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按 train, valid, test (或清单原顺序) 列出所有扫描.
    pub fn entries(&self) -> Vec<ScanEntry<'_>> {
        match self {
            ScanManifest::Grouped { train, valid, test } => Group::ALL
                .into_iter()
                .zip([train, valid, test])
                .flat_map(|(group, names)| {
                    names.iter().map(move |name| ScanEntry {
                        name,
                        group: Some(group),
                    })
                })
                .collect(),
            ScanManifest::Flat(v) => v
                .iter()
                .map(|name| ScanEntry { name, group: None })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat() {
        let m: ScanManifest = serde_json::from_str(r#"["100", "101"]"#).unwrap();
        assert_eq!(m.split_mode(), SplitMode::BySample);
        assert_eq!(m.len(), 2);
        assert!(m.entries().iter().all(|e| e.group.is_none()));
    }

    #[test]
    fn test_parse_grouped() {
        let m: ScanManifest =
            serde_json::from_str(r#"{"train": ["a", "b"], "test": ["c"]}"#).unwrap();
        assert_eq!(m.split_mode(), SplitMode::ByScan);
        let entries = m.entries();
        assert_eq!(
            entries,
            vec![
                ScanEntry { name: "a", group: Some(Group::Train) },
                ScanEntry { name: "b", group: Some(Group::Train) },
                ScanEntry { name: "c", group: Some(Group::Test) },
            ]
        );
    }

    #[test]
    fn test_empty() {
        let m: ScanManifest = serde_json::from_str("[]").unwrap();
        assert!(m.is_empty());
        assert_eq!(m.split_mode(), SplitMode::BySample);
        let m: ScanManifest = serde_json::from_str("{}").unwrap();
        assert!(m.is_empty());
    }
}
