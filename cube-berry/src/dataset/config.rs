//! 数据集合配置.

use crate::consts::DEFAULT_SEED;
use crate::data::View;
use crate::dataset::{home_dataset_dir, home_dataset_dir_with, ScanManifest};
use crate::error::{CollectError, VolumeError};
use crate::partition::{Group, SplitSpec};
use crate::select::RetentionPolicy;
use crate::transform::{grid_of, BlockShape, NormalizeScope};
use crate::Idx3d;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 扫描根目录的环境变量名.
pub const NIFTII_DIR_ENV: &str = "CUBE_NIFTII_DIR";

/// 输出根目录的环境变量名.
pub const DATASET_DIR_ENV: &str = "CUBE_DATASET_DIR";

/// 一次数据集合构建的全部参数. 从 JSON 文件读取.
///
/// ```json
/// {
///     "niftii_dir": "/data/niftii/wmh/GE3T",
///     "niftii_labels": "wmh.nii.gz",
///     "niftii_images": "orig/3DT1.nii.gz",
///     "collection_name": "GE3T_256x256x192_wmh",
///     "scan_shape": [256, 256, 192],
///     "input_shape": [256, 1, 192],
///     "labels": [1.0],
///     "scans": ["100", "101", "102"]
/// }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct CollectionConfig {
    /// 扫描根目录. 每个扫描占据其中一个子目录.
    ///
    /// 缺省时依次取 `$CUBE_NIFTII_DIR`, `$HOME/dataset/niftii`.
    #[serde(default = "default_niftii_dir")]
    pub niftii_dir: PathBuf,

    /// 扫描目录内标注文件的相对路径.
    pub niftii_labels: String,

    /// 扫描目录内图像文件的相对路径.
    pub niftii_images: String,

    /// 输出根目录.
    ///
    /// 缺省时依次取 `$CUBE_DATASET_DIR`, `$HOME/dataset`.
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,

    /// 数据集合名. 数据集合写入 `dataset_dir/collection_name`.
    pub collection_name: String,

    /// 重采样目标形状.
    pub scan_shape: Idx3d,

    /// 样本 (块) 形状. 任一轴为 1 时输出 2D 切片.
    #[serde(alias = "block_shape")]
    pub input_shape: BlockShape,

    /// 视为前景的标注值.
    pub labels: Vec<f32>,

    /// 是否反转掩码.
    #[serde(default)]
    pub invert: bool,

    /// 是否只保留含前景的样本 (以及约十分之一的纯背景样本).
    #[serde(default = "default_only_masks")]
    pub only_masks: bool,

    /// 前景窗口向两侧扩展的样本个数. 给出时窗口内的纯背景样本全部保留,
    /// 仅在 `only_masks` 为真时生效.
    #[serde(default)]
    pub mask_window: Option<usize>,

    /// 读取后的轴顺序. 缺省时保持文件轴顺序.
    #[serde(default)]
    pub view: Option<View>,

    /// 扫描清单.
    pub scans: ScanManifest,

    /// 归一化粒度.
    #[serde(default)]
    pub normalize: NormalizeScope,

    /// 按样本划分时的随机种子.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// 按样本划分时的比例.
    #[serde(default)]
    pub split: SplitSpec,
}

/// 读取非空的目录环境变量.
fn dir_from_env(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|d| !d.is_empty()).map(PathBuf::from)
}

/// 扫描根目录缺省值. 无法确定用户主目录时退化为相对路径 `niftii`.
pub fn default_niftii_dir() -> PathBuf {
    dir_from_env(NIFTII_DIR_ENV)
        .or_else(|| home_dataset_dir_with(["niftii"]))
        .unwrap_or_else(|| PathBuf::from("niftii"))
}

/// 输出根目录缺省值. 无法确定用户主目录时退化为相对路径 `dataset`.
pub fn default_dataset_dir() -> PathBuf {
    dir_from_env(DATASET_DIR_ENV)
        .or_else(home_dataset_dir)
        .unwrap_or_else(|| PathBuf::from("dataset"))
}

const fn default_only_masks() -> bool {
    true
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl CollectionConfig {
    /// 从 JSON 字符串解析配置, 并检查其合法性.
    pub fn from_json_str(s: &str) -> Result<Self, CollectError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取配置, 并检查其合法性.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CollectError> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// 检查配置层面的前置条件: 扫描清单非空, 重采样形状非零, 且能被块形状整除.
    pub fn validate(&self) -> Result<(), CollectError> {
        if self.scans.is_empty() {
            return Err(CollectError::EmptyScanList);
        }
        let (a, b, c) = self.scan_shape;
        if a == 0 || b == 0 || c == 0 {
            return Err(VolumeError::ZeroLengthAxis {
                shape: self.scan_shape,
            }
            .into());
        }
        grid_of(self.scan_shape, self.input_shape)?;
        Ok(())
    }

    /// 数据集合根目录.
    #[inline]
    pub fn collection_dir(&self) -> PathBuf {
        self.dataset_dir.join(&self.collection_name)
    }

    /// 分组 `group` 的样本保留策略. 测试组总是保留全部样本.
    pub fn retention_for(&self, group: Option<Group>) -> RetentionPolicy {
        match (group, self.mask_window) {
            (Some(Group::Test), _) => RetentionPolicy::All,
            (_, Some(offset)) if self.only_masks => RetentionPolicy::MaskWindow { offset },
            _ => RetentionPolicy::from_only_masks(self.only_masks),
        }
    }

    /// 每次扫描切分得到的候选样本个数.
    pub fn blocks_per_scan(&self) -> usize {
        let (g0, g1, g2) = grid_of(self.scan_shape, self.input_shape).unwrap_or((0, 0, 0));
        g0 * g1 * g2
    }
}
