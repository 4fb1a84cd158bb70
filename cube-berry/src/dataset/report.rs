//! 构建结果.

use crate::partition::Group;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 单次扫描的处理统计.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanStats {
    /// 切分得到的候选样本个数.
    pub candidates: usize,

    /// 保留并写入的样本个数.
    pub kept: usize,

    /// 保留样本中含前景的个数.
    pub foreground: usize,

    /// 处理该扫描花费的总时间 (包括读取与写入).
    pub elapsed: Duration,
}

impl ScanStats {
    /// 保留样本中的纯背景个数.
    #[inline]
    pub fn background(&self) -> usize {
        self.kept - self.foreground
    }
}

/// 单次扫描的处理结果. 失败时只保留错误描述, 已写入的部分样本不会回滚.
#[derive(Clone, Debug)]
pub struct ScanOutcome {
    /// 扫描名.
    pub scan: String,

    /// 预先分配的组.
    pub group: Option<Group>,

    /// 统计信息或错误描述.
    pub result: Result<ScanStats, String>,
}

impl ScanOutcome {
    /// 是否处理成功.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 数据集合最终构建结果.
#[derive(Clone, Debug)]
pub struct CollectionReport {
    root: PathBuf,
    scans: Vec<ScanOutcome>,
    partition: Option<(usize, usize, usize)>,
    unpaired: Vec<String>,
}

impl CollectionReport {
    /// 以数据集合根目录初始化.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_owned(),
            scans: Vec::new(),
            partition: None,
            unpaired: Vec::new(),
        }
    }

    /// 记录一个扫描的结果.
    #[inline]
    pub fn push(&mut self, outcome: ScanOutcome) {
        self.scans.push(outcome);
    }

    /// 记录按样本划分后的 (train, valid, test) 大小.
    #[inline]
    pub fn set_partition(&mut self, sizes: (usize, usize, usize)) {
        self.partition = Some(sizes);
    }

    /// 记录划分时缺少图像或标注而留在扁平目录中的样本名.
    #[inline]
    pub fn set_unpaired(&mut self, stems: Vec<String>) {
        self.unpaired = stems;
    }

    /// 数据集合根目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 所有扫描的结果, 按处理顺序.
    #[inline]
    pub fn scans(&self) -> &[ScanOutcome] {
        &self.scans
    }

    /// 处理失败的扫描.
    pub fn failed(&self) -> impl Iterator<Item = &ScanOutcome> {
        self.scans.iter().filter(|s| !s.is_ok())
    }

    /// 写入的样本总数.
    pub fn kept_total(&self) -> usize {
        self.scans
            .iter()
            .filter_map(|s| s.result.as_ref().ok())
            .map(|s| s.kept)
            .sum()
    }

    /// 按样本划分后的 (train, valid, test) 大小. 按扫描预先分组时为 `None`.
    #[inline]
    pub fn partition(&self) -> Option<(usize, usize, usize)> {
        self.partition
    }

    /// 未参与划分的样本名.
    #[inline]
    pub fn unpaired(&self) -> &[String] {
        &self.unpaired
    }
}

impl fmt::Display for CollectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const S4: &str = "    ";

        writeln!(f, "Collection `{}`:", self.root.display())?;
        for s in self.scans.iter() {
            let group = s.group.map_or_else(String::new, |g| format!(" [{g}]"));
            match &s.result {
                Ok(stats) => writeln!(
                    f,
                    "{S4}{}{group}: kept {} of {} ({} foreground, {} background) in {} ms",
                    s.scan,
                    stats.kept,
                    stats.candidates,
                    stats.foreground,
                    stats.background(),
                    stats.elapsed.as_millis()
                )?,
                Err(e) => writeln!(f, "{S4}{}{group}: FAILED: {e}", s.scan)?,
            }
        }
        write!(
            f,
            "{S4}Samples written: {}, failed scans: {}",
            self.kept_total(),
            self.failed().count()
        )?;
        if let Some((train, valid, test)) = self.partition {
            write!(f, "\n{S4}Split: train {train}, valid {valid}, test {test}")?;
        }
        if !self.unpaired.is_empty() {
            write!(
                f,
                "\n{S4}Unpaired samples left in flat layout: {}",
                self.unpaired.join(", ")
            )?;
        }
        Ok(())
    }
}
