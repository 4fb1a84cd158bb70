//! 样本的持久化存储.
//!
//! 2D 模式下样本保存为单通道 8-bit png; 3D 模式下保存为 8-bit npy.

use crate::error::PersistError;
use crate::transform::SampleMode;
use ndarray::{ArrayView3, Axis};
use std::path::{Path, PathBuf};

/// 样本文件名 (不含扩展名).
///
/// 一般为 `{scan}_{ordinal:03}`. 体积整体作为唯一样本 (`total == 1`) 时只用扫描名.
pub fn sample_stem(scan: &str, ordinal: usize, total: usize) -> String {
    if total == 1 {
        scan.to_string()
    } else {
        format!("{scan}_{ordinal:03}")
    }
}

/// 按样本粒度选择编码方式的写入器.
#[derive(Copy, Clone, Debug)]
pub struct SampleWriter {
    mode: SampleMode,
}

impl SampleWriter {
    /// 构建写入器.
    #[inline]
    pub fn new(mode: SampleMode) -> Self {
        Self { mode }
    }

    /// 样本文件扩展名.
    #[inline]
    pub fn extension(&self) -> &'static str {
        match self.mode {
            SampleMode::Slice2d { .. } => "png",
            SampleMode::Cuboid3d => "npy",
        }
    }

    /// 将 `sample` 写入 `dir/{stem}.{ext}`, 返回写入的完整路径.
    pub fn write(
        &self,
        dir: &Path,
        stem: &str,
        sample: ArrayView3<'_, u8>,
    ) -> Result<PathBuf, PersistError> {
        let path = dir.join(format!("{stem}.{}", self.extension()));
        match self.mode {
            SampleMode::Slice2d { axis } => write_png(&path, sample, axis)?,
            SampleMode::Cuboid3d => ndarray_npy::write_npy(&path, &sample)?,
        }
        Ok(path)
    }
}

/// 去掉长度为 1 的 `axis` 轴, 将剩余 `(高, 宽)` 平面保存为灰度图.
fn write_png(path: &Path, sample: ArrayView3<'_, u8>, axis: usize) -> Result<(), PersistError> {
    if sample.len_of(Axis(axis)) != 1 {
        return Err(PersistError::NotPlanar(sample.dim()));
    }
    let plane = sample.index_axis(Axis(axis), 0);
    let (height, width) = plane.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in plane.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
    }
    buf.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use ndarray_npy::read_npy;

    #[test]
    fn test_stem() {
        assert_eq!(sample_stem("100", 7, 256), "100_007");
        assert_eq!(sample_stem("100", 1234, 2000), "100_1234");
        assert_eq!(sample_stem("100", 0, 1), "100");
    }

    #[test]
    fn test_write_png() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = SampleWriter::new(SampleMode::Slice2d { axis: 1 });
        let sample = Array3::from_shape_fn((3, 1, 5), |(h, _, w)| (h * 10 + w) as u8);

        let path = writer.write(tmp.path(), "s_000", sample.view()).unwrap();
        assert_eq!(path, tmp.path().join("s_000.png"));

        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(4, 2).0, [24]);
    }

    #[test]
    fn test_write_npy() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = SampleWriter::new(SampleMode::Cuboid3d);
        let sample = Array3::from_shape_fn((2, 3, 4), |(i, j, k)| (i + j + k) as u8);

        let path = writer.write(tmp.path(), "s_001", sample.view()).unwrap();
        let back: Array3<u8> = read_npy(&path).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_not_planar() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = SampleWriter::new(SampleMode::Slice2d { axis: 0 });
        let sample = Array3::<u8>::zeros((2, 2, 2));
        assert!(matches!(
            writer.write(tmp.path(), "bad", sample.view()),
            Err(PersistError::NotPlanar((2, 2, 2)))
        ));
    }
}
