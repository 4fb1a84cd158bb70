//! 从类别标注生成二值掩码.

use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
use ndarray::{Array, ArrayView, Dimension};

/// 将类别标注 `label` 转换为 `{0, 255}` 二值掩码.
///
/// 体素值与 `labels` 中某个值严格相等 (不做容差比较) 时视为命中.
/// `invert == false` 时命中体素为前景; `invert == true` 时未命中体素为前景.
/// 即 `mask[v] == 255` 当且仅当 `(label[v] in labels) xor invert`.
///
/// 输出总是 `u8`, 与输入类型无关.
pub fn build_mask<D: Dimension>(label: ArrayView<'_, f32, D>, labels: &[f32], invert: bool) -> Array<u8, D> {
    label.mapv(|v| {
        if labels.contains(&v) != invert {
            MASK_FOREGROUND
        } else {
            MASK_BACKGROUND
        }
    })
}
