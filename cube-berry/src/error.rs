//! 运行时错误.

use crate::Idx3d;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 体积形状相关的前置条件错误. 出现时当前扫描无法继续处理.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum VolumeError {
    /// 形状中存在长度为 0 的轴.
    #[error("shape {shape:?} has a zero-length axis")]
    ZeroLengthAxis {
        /// 出错的形状.
        shape: Idx3d,
    },

    /// 体积形状不能被块形状整除.
    #[error("volume shape {shape:?} is not divisible by block shape {block:?}")]
    NotDivisible {
        /// 体积形状.
        shape: Idx3d,
        /// 块形状.
        block: Idx3d,
    },

    /// 同一扫描的图像与标注形状不一致.
    #[error("image shape {image:?} does not match label shape {label:?}")]
    PairMismatch {
        /// 图像形状.
        image: Idx3d,
        /// 标注形状.
        label: Idx3d,
    },

    /// 重组时块个数与网格不符.
    #[error("expected {expected} blocks for reassembly, got {actual}")]
    BlockCountMismatch {
        /// 网格要求的块个数.
        expected: usize,
        /// 实际块个数.
        actual: usize,
    },

    /// 重组时某个块的形状不符.
    #[error("block #{index} has shape {actual:?}, expected {expected:?}")]
    BlockShapeMismatch {
        /// 块序号.
        index: usize,
        /// 期望形状.
        expected: Idx3d,
        /// 实际形状.
        actual: Idx3d,
    },
}

/// 读取体积文件错误.
#[derive(Debug, Error)]
pub enum ReadError {
    /// 底层 nifti 解析错误 (包括文件不存在).
    #[error("failed to read {path}: {source}")]
    Nifti {
        /// 文件路径.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: nifti::NiftiError,
    },

    /// 文件内容不是 3D 体积 (去掉长度为 1 的尾部维度后仍然不是 3 维).
    #[error("{path} is not a 3D volume (shape {shape:?})")]
    NotVolume {
        /// 文件路径.
        path: PathBuf,
        /// 实际形状.
        shape: Vec<usize>,
    },

    /// 找不到对应的体积.
    #[error("no volume found at {0}")]
    NotFound(PathBuf),
}

/// 持久化单个样本错误.
#[derive(Debug, Error)]
pub enum PersistError {
    /// 栅格图像编码 / 写入错误.
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    /// npy 写入错误.
    #[error("failed to write npy: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),

    /// 2D 模式下的样本不存在长度为 1 的轴.
    #[error("sample of shape {0:?} has no unit axis for 2D output")]
    NotPlanar(Idx3d),

    /// 其他底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// 构建数据集合时的错误.
#[derive(Debug, Error)]
pub enum CollectError {
    /// 扫描清单为空.
    #[error("scan list is empty")]
    EmptyScanList,

    /// 配置文件解析错误.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// 形状前置条件错误.
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// 体积读取错误.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// 样本持久化错误.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// 其他底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// 形状操作结果.
pub type VolumeResult<T> = Result<T, VolumeError>;
