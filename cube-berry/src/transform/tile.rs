//! 立方块切分与重组.
//!
//! 切分顺序为块网格上的行优先序: 最后一个轴变化最快, 第一个轴变化最慢.
//! 对同一扫描的图像和标注分别切分时, 序号相同的两个块恰好覆盖同一空间区域.

use crate::error::{VolumeError, VolumeResult};
use crate::Idx3d;
use itertools::iproduct;
use ndarray::{s, Array3, ArrayView3};
use serde::Deserialize;
use std::fmt;

/// 样本粒度.
///
/// 块形状中任一轴为 1 时表示 2D 切片模式, 否则为 3D 立方块模式.
/// 该区别只影响持久化编码, 不影响切分计算.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SampleMode {
    /// 2D 切片. `axis` 为第一个长度为 1 的轴.
    Slice2d {
        /// 被压缩掉的轴.
        axis: usize,
    },

    /// 3D 立方块.
    Cuboid3d,
}

impl SampleMode {
    /// 是否为 2D 切片模式.
    #[inline]
    pub fn is_2d(&self) -> bool {
        matches!(self, Self::Slice2d { .. })
    }
}

/// 块形状. 三个轴均为正整数.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(try_from = "[usize; 3]")]
pub struct BlockShape(Idx3d);

impl BlockShape {
    /// 构建块形状. 存在长度为 0 的轴时返回 `Err`.
    pub fn new(dims: Idx3d) -> VolumeResult<Self> {
        let (a, b, c) = dims;
        if a == 0 || b == 0 || c == 0 {
            return Err(VolumeError::ZeroLengthAxis { shape: dims });
        }
        Ok(Self(dims))
    }

    /// 获取三个轴的长度.
    #[inline]
    pub const fn dims(&self) -> Idx3d {
        self.0
    }

    /// 块内体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (a, b, c) = self.0;
        a * b * c
    }

    /// 根据形状判断样本粒度.
    pub fn mode(&self) -> SampleMode {
        let (a, b, c) = self.0;
        match [a, b, c].iter().position(|&d| d == 1) {
            Some(axis) => SampleMode::Slice2d { axis },
            None => SampleMode::Cuboid3d,
        }
    }
}

impl TryFrom<[usize; 3]> for BlockShape {
    type Error = VolumeError;

    #[inline]
    fn try_from([a, b, c]: [usize; 3]) -> Result<Self, Self::Error> {
        Self::new((a, b, c))
    }
}

impl fmt::Display for BlockShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b, c) = self.0;
        write!(f, "{a}x{b}x{c}")
    }
}

/// 计算 `shape` 被 `block` 切分后的块网格大小.
///
/// `shape` 存在长度为 0 的轴, 或任一轴不能被整除时返回 `Err`.
pub fn grid_of(shape: Idx3d, block: BlockShape) -> VolumeResult<Idx3d> {
    let (d0, d1, d2) = shape;
    if d0 == 0 || d1 == 0 || d2 == 0 {
        return Err(VolumeError::ZeroLengthAxis { shape });
    }
    let (b0, b1, b2) = block.dims();
    if d0 % b0 != 0 || d1 % b1 != 0 || d2 % b2 != 0 {
        return Err(VolumeError::NotDivisible {
            shape,
            block: block.dims(),
        });
    }
    Ok((d0 / b0, d1 / b1, d2 / b2))
}

/// 将体积按 `block` 切分为互不重叠的块, 按行优先网格序返回.
///
/// 返回块的个数等于 `grid_of(volume.dim(), block)` 三个分量之积.
pub fn tile<T: Clone>(volume: ArrayView3<'_, T>, block: BlockShape) -> VolumeResult<Vec<Array3<T>>> {
    let (g0, g1, g2) = grid_of(volume.dim(), block)?;
    let (b0, b1, b2) = block.dims();

    let blocks = iproduct!(0..g0, 0..g1, 0..g2)
        .map(|(i, j, k)| {
            volume
                .slice(s![
                    i * b0..(i + 1) * b0,
                    j * b1..(j + 1) * b1,
                    k * b2..(k + 1) * b2
                ])
                .to_owned()
        })
        .collect();
    Ok(blocks)
}

/// `tile` 的逆操作. 将按行优先网格序排列的 `blocks` 拼回原体积.
///
/// 块个数与 `grid` 不符, 或任一块形状不等于 `block` 时返回 `Err`.
pub fn reassemble<T: Clone + Default>(
    blocks: &[Array3<T>],
    grid: Idx3d,
    block: BlockShape,
) -> VolumeResult<Array3<T>> {
    let (g0, g1, g2) = grid;
    let expected = g0 * g1 * g2;
    if blocks.len() != expected {
        return Err(VolumeError::BlockCountMismatch {
            expected,
            actual: blocks.len(),
        });
    }
    let (b0, b1, b2) = block.dims();
    let mut volume = Array3::<T>::default((g0 * b0, g1 * b1, g2 * b2));

    for (index, ((i, j, k), data)) in iproduct!(0..g0, 0..g1, 0..g2).zip(blocks).enumerate() {
        if data.dim() != block.dims() {
            return Err(VolumeError::BlockShapeMismatch {
                index,
                expected: block.dims(),
                actual: data.dim(),
            });
        }
        volume
            .slice_mut(s![
                i * b0..(i + 1) * b0,
                j * b1..(j + 1) * b1,
                k * b2..(k + 1) * b2
            ])
            .assign(data);
    }
    Ok(volume)
}
