//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::{NiftiReader, View, VolumePair, VolumeReader};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};
pub use crate::consts::{ElemType, DEFAULT_SEED};

pub use crate::error::{CollectError, PersistError, ReadError, VolumeError};

pub use crate::transform::{build_mask, normalize, resample, tile, BlockShape, NormalizeScope, SampleMode};

pub use crate::select::{select_indices, RetentionPolicy};

pub use crate::partition::{partition, Group, Partition, SplitMode, SplitSpec};

pub use crate::dataset::home_dataset_dir_with;
pub use crate::dataset::{self, CollectionConfig, CollectionReport, Collector, ScanManifest};
