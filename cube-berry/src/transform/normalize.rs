//! 强度归一化.

use ndarray::{Array, ArrayView, Dimension};
use num::ToPrimitive;
use serde::Deserialize;

/// 归一化粒度. 同一数据集合内的所有样本必须使用相同粒度,
/// 才能保证强度尺度可比.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeScope {
    /// 每个切分后的样本用自身最大值归一化.
    #[default]
    PerSample,

    /// 整个重采样后的体积用全局最大值归一化, 然后再切分.
    PerVolume,
}

impl NormalizeScope {
    /// 获取整个体积的参考最大值. 仅 `PerVolume` 时返回 `Some`.
    pub fn reference_max<T, D>(self, volume: ArrayView<'_, T, D>) -> Option<f64>
    where
        T: Copy + ToPrimitive,
        D: Dimension,
    {
        match self {
            NormalizeScope::PerSample => None,
            NormalizeScope::PerVolume => Some(max_value(volume)),
        }
    }
}

/// 数组最大值. 空数组或全 NaN 时为 `-inf`.
pub fn max_value<T, D>(data: ArrayView<'_, T, D>) -> f64
where
    T: Copy + ToPrimitive,
    D: Dimension,
{
    data.iter()
        .filter_map(|v| v.to_f64())
        .fold(f64::NEG_INFINITY, f64::max)
}

/// 以给定的最大值 `max` 将数组线性缩放到 8-bit 无符号整数范围.
///
/// `max` 为 0 (或不是有限值) 时保持原值, 避免除 0; 否则所有元素先除以 `max`.
/// 之后乘以 255, 再截断为 `u8`. 截断是饱和的: 负数与 NaN 映射为 0,
/// 超过 255 的值映射为 255.
pub fn normalize_by<T, D>(data: ArrayView<'_, T, D>, max: f64) -> Array<u8, D>
where
    T: Copy + ToPrimitive,
    D: Dimension,
{
    let divisor = if max == 0.0 || !max.is_finite() { 1.0 } else { max };
    data.mapv(|v| (v.to_f64().unwrap_or(0.0) / divisor * 255.0) as u8)
}

/// 将数组按自身最大值线性缩放到 8-bit 无符号整数范围. 见 [`normalize_by`].
///
/// 对整个体积调用后再切分, 与先切分再对每块调用 `normalize_by(block, max_value(volume))`
/// 结果完全一致.
#[inline]
pub fn normalize<T, D>(data: ArrayView<'_, T, D>) -> Array<u8, D>
where
    T: Copy + ToPrimitive,
    D: Dimension,
{
    let max = max_value(data.view());
    normalize_by(data, max)
}
