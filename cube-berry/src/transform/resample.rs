//! 最近邻重采样.

use crate::error::{VolumeError, VolumeResult};
use crate::Idx3d;
use ndarray::{Array3, ArrayView3};

/// 计算单个轴上 "输出下标 -> 输入下标" 的最近邻映射.
///
/// 输入长度为 `n`, 输出长度为 `m` 时, 输出下标 `o` 对应输入坐标
/// `o * (n - 1) / (m - 1)` (`m == 1` 时为 0), 四舍五入后截断到 `[0, n - 1]`.
/// 两端体素中心对齐, 因此首尾体素总会被保留.
fn nearest_indices(n: usize, m: usize) -> Vec<usize> {
    debug_assert!(n > 0 && m > 0);
    if m == 1 {
        return vec![0];
    }
    let ratio = (n - 1) as f64 / (m - 1) as f64;
    (0..m)
        .map(|o| ((o as f64 * ratio + 0.5).floor() as usize).min(n - 1))
        .collect()
}

/// 每个轴上的缩放系数 `target / source`. 不要求为整数.
#[inline]
pub fn zoom_factors(source: Idx3d, target: Idx3d) -> [f64; 3] {
    [
        target.0 as f64 / source.0 as f64,
        target.1 as f64 / source.1 as f64,
        target.2 as f64 / source.2 as f64,
    ]
}

/// 以最近邻插值 (0 阶) 将 `volume` 重采样到 `target` 形状.
///
/// 不会引入任何新值, 因此对类别型标注同样适用. 图像和标注必须使用同一 `target`,
/// 以保证两者形状对齐.
///
/// 源形状或目标形状存在长度为 0 的轴时返回 `Err`.
pub fn resample<T: Clone>(volume: ArrayView3<'_, T>, target: Idx3d) -> VolumeResult<Array3<T>> {
    let source = volume.dim();
    for shape in [source, target] {
        let (a, b, c) = shape;
        if a == 0 || b == 0 || c == 0 {
            return Err(VolumeError::ZeroLengthAxis { shape });
        }
    }
    if source == target {
        return Ok(volume.to_owned());
    }

    let m0 = nearest_indices(source.0, target.0);
    let m1 = nearest_indices(source.1, target.1);
    let m2 = nearest_indices(source.2, target.2);
    Ok(Array3::from_shape_fn(target, |(i, j, k)| {
        volume[(m0[i], m1[j], m2[k])].clone()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_constant_upsample() {
        let vol = Array3::<f32>::from_elem((2, 2, 2), 5.0);
        let out = resample(vol.view(), (4, 4, 4)).unwrap();
        assert_eq!(out.dim(), (4, 4, 4));
        assert!(out.iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_nearest_indices() {
        assert_eq!(nearest_indices(2, 4), vec![0, 0, 1, 1]);
        assert_eq!(nearest_indices(4, 2), vec![0, 3]);
        assert_eq!(nearest_indices(5, 1), vec![0]);
        assert_eq!(nearest_indices(3, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_labels_stay_categorical() {
        let vol = Array3::from_shape_fn((3, 5, 7), |(i, j, k)| ((i + j + k) % 3) as f32);
        let out = resample(vol.view(), (8, 4, 9)).unwrap();
        assert_eq!(out.dim(), (8, 4, 9));
        let allowed: HashSet<u32> = vol.iter().map(|v| v.to_bits()).collect();
        assert!(out.iter().all(|v| allowed.contains(&v.to_bits())));
    }

    #[test]
    fn test_identity_and_corners() {
        let vol = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (i * 100 + j * 10 + k) as f32);
        assert_eq!(resample(vol.view(), (3, 4, 5)).unwrap(), vol);

        let out = resample(vol.view(), (6, 2, 10)).unwrap();
        assert_eq!(out[(0, 0, 0)], vol[(0, 0, 0)]);
        assert_eq!(out[(5, 1, 9)], vol[(2, 3, 4)]);
    }

    #[test]
    fn test_zero_length_axis() {
        let vol = Array3::<f32>::zeros((0, 2, 2));
        assert_eq!(
            resample(vol.view(), (4, 4, 4)),
            Err(VolumeError::ZeroLengthAxis { shape: (0, 2, 2) })
        );
        let vol = Array3::<f32>::zeros((2, 2, 2));
        assert_eq!(
            resample(vol.view(), (4, 0, 4)),
            Err(VolumeError::ZeroLengthAxis { shape: (4, 0, 4) })
        );
    }

    #[test]
    fn test_zoom_factors() {
        assert_eq!(zoom_factors((2, 4, 8), (4, 2, 8)), [2.0, 0.5, 1.0]);
    }
}
