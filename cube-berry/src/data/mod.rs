use std::path::Path;

use ndarray::{Array3, ArrayView3};

use crate::error::{ReadError, VolumeError, VolumeResult};
use crate::transform::{build_mask, resample};
use crate::Idx3d;

pub mod reader;
pub mod view;

pub use reader::{NiftiReader, VolumeReader};
pub use view::View;

/// 一次扫描的 3D 图像与对应的 3D 类别标注. 体素值均以 `f32` 保存.
///
/// 该结构完全透明, 仅包含两个公开的 `image` 和 `label` 子结构,
/// 用户可以直接使用它们来实现相关上层功能.
///
/// # 注意
///
/// 刚读取时两者形状可以不同; 经 [`VolumePair::resample`] 之后两者形状一定一致.
#[derive(Debug, Clone)]
pub struct VolumePair {
    /// 3D 强度图像.
    pub image: Array3<f32>,

    /// 3D 类别标注.
    pub label: Array3<f32>,
}

impl VolumePair {
    /// 分别读取图像和对应标注. 如果任一文件读取失败, 则返回 `Err`.
    pub fn open<R: VolumeReader + ?Sized>(
        reader: &R,
        image_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
    ) -> Result<Self, ReadError> {
        let image = reader.read(image_path.as_ref())?;
        let label = reader.read(label_path.as_ref())?;
        Ok(Self { image, label })
    }

    /// 按 `view` 置换图像和标注的轴顺序. `None` 时保持文件轴顺序.
    #[inline]
    pub fn with_view(self, view: Option<View>) -> Self {
        match view {
            Some(v) => Self {
                image: v.apply(self.image),
                label: v.apply(self.label),
            },
            None => self,
        }
    }

    /// 以最近邻插值将图像和标注重采样到同一 `target` 形状.
    pub fn resample(self, target: Idx3d) -> VolumeResult<Self> {
        let image = resample(self.image.view(), target)?;
        let label = resample(self.label.view(), target)?;
        Ok(Self { image, label })
    }

    /// 获取对齐后的共同形状. 若图像与标注形状不一致则返回 `Err`.
    pub fn dim(&self) -> VolumeResult<Idx3d> {
        let (image, label) = (self.image.dim(), self.label.dim());
        if image == label {
            Ok(image)
        } else {
            Err(VolumeError::PairMismatch { image, label })
        }
    }

    /// 由标注生成 `{0, 255}` 二值掩码.
    #[inline]
    pub fn mask(&self, labels: &[f32], invert: bool) -> Array3<u8> {
        build_mask(self.label.view(), labels, invert)
    }

    /// 获得图像的一份不可变 shallow copy.
    #[inline]
    pub fn image(&self) -> ArrayView3<'_, f32> {
        self.image.view()
    }
}
