//! 数据集合构建.
//!
//! 从扫描清单出发, 逐个读取、变换、筛选并持久化样本, 最后 (按需) 划分为 train / valid / test.

use std::path::{Path, PathBuf};

mod collect;
mod config;
mod layout;
mod loader;
mod manifest;
mod persist;
mod report;

pub use collect::Collector;
pub use config::{default_dataset_dir, default_niftii_dir, CollectionConfig, DATASET_DIR_ENV, NIFTII_DIR_ENV};
pub use layout::{CollectionLayout, IMAGES_DIR, LABELS_DIR};
pub use loader::{scan_loader, ScanLoader};
pub use manifest::{ScanEntry, ScanManifest};
pub use persist::{sample_stem, SampleWriter};
pub use report::{CollectionReport, ScanOutcome, ScanStats};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}
