//! 解剖学视图.

use ndarray::Array3;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// 解剖学切片方向. 决定哪一个轴作为第 0 轴 (切片轴).
///
/// 体积按文件中的 `(x, y, z)` 顺序解释:
///
/// 1. `Sagittal`: `(x, y, z)`, 沿左右方向切片;
/// 2. `Coronal`: `(y, x, z)`, 沿前后方向切片;
/// 3. `Axial`: `(z, x, y)`, 沿上下方向切片.
///
/// 每次运行只解析一次, 之后对图像和标注施加同一轴置换.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// 冠状面.
    #[default]
    Coronal,

    /// 横断面.
    Axial,

    /// 矢状面.
    Sagittal,
}

impl View {
    /// 相对文件轴顺序的轴置换.
    #[inline]
    pub const fn axes(self) -> [usize; 3] {
        match self {
            View::Sagittal => [0, 1, 2],
            View::Coronal => [1, 0, 2],
            View::Axial => [2, 0, 1],
        }
    }

    /// 将 `volume` 置换为该视图的轴顺序. 只改变步长, 不拷贝数据.
    #[inline]
    pub fn apply<T>(self, volume: Array3<T>) -> Array3<T> {
        volume.permuted_axes(self.axes())
    }
}

/// 解析视图名称失败.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseViewError(String);

impl fmt::Display for ParseViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown view `{}`, expected coronal, axial or sagittal",
            self.0
        )
    }
}

impl std::error::Error for ParseViewError {}

impl FromStr for View {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coronal" => Ok(View::Coronal),
            "axial" => Ok(View::Axial),
            "sagittal" => Ok(View::Sagittal),
            _ => Err(ParseViewError(s.to_string())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Coronal => "coronal",
            View::Axial => "axial",
            View::Sagittal => "sagittal",
        };
        f.write_str(name)
    }
}
