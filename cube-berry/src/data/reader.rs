//! 体积文件读取.

use crate::error::ReadError;
use ndarray::{Array3, Axis, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::Path;

/// 能从路径读取 3D 浮点体积的对象.
///
/// 返回的数组按文件中的轴顺序组织, 且图像与标注的体素顺序必须一致.
pub trait VolumeReader {
    /// 读取 `path` 处的体积.
    fn read(&self, path: &Path) -> Result<Array3<f32>, ReadError>;
}

/// nii / nii.gz 格式读取器.
#[derive(Copy, Clone, Debug, Default)]
pub struct NiftiReader;

impl VolumeReader for NiftiReader {
    fn read(&self, path: &Path) -> Result<Array3<f32>, ReadError> {
        let nifti_err = |source| ReadError::Nifti {
            path: path.to_owned(),
            source,
        };
        let obj = ReaderOptions::new().read_file(path).map_err(nifti_err)?;
        let mut data = obj
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(nifti_err)?;

        // 4D 文件的时间维度长度为 1 时, 直接去掉.
        while data.ndim() > 3 && data.len_of(Axis(data.ndim() - 1)) == 1 {
            let last = Axis(data.ndim() - 1);
            data = data.index_axis_move(last, 0);
        }

        let shape = data.shape().to_vec();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| ReadError::NotVolume {
                path: path.to_owned(),
                shape,
            })?;

        // nifti 数据按列优先存储, 这里统一为标准布局.
        Ok(data.as_standard_layout().into_owned())
    }
}
