//! 体积变换: 重采样, 掩码, 切分与强度归一化.

mod mask;
mod normalize;
mod resample;
mod tile;

pub use mask::build_mask;
pub use normalize::{max_value, normalize, normalize_by, NormalizeScope};
pub use resample::{resample, zoom_factors};
pub use tile::{grid_of, reassemble, tile, BlockShape, SampleMode};
