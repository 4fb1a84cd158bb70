#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 将成对的 3D 医学扫描 (图像 + 类别标注) 转换为可直接训练的 2D / 3D 样本数据集.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 流程
//!
//! 对扫描清单中的每个扫描, 依次:
//!
//! 1. 读取 nifti 图像与标注 (`data`), 并按需置换为冠状面 / 横断面 / 矢状面视图;
//! 2. 以最近邻插值重采样到统一形状 (`transform::resample`);
//! 3. 由标注值集合生成 `{0, 255}` 二值掩码 (`transform::mask`);
//! 4. 切分为互不重叠的块 (`transform::tile`);
//! 5. 筛选样本: 含前景的块全部保留, 纯背景块约保留十分之一 (`select`);
//! 6. 图像归一化到 8-bit (`transform::normalize`), 2D 样本写为 png, 3D 样本写为 npy (`dataset`).
//!
//! 扫描清单为扁平列表时, 全部扫描处理完后按 80 : 15 : 5 随机划分为
//! train / valid / test (`partition`); 清单按组给出时直接写入对应组.
//!
//! # 注意
//!
//! 1. 构建数据集合时会先删除同名的旧数据集合, 且不可恢复.
//! 2. 单个扫描处理失败不会中断流程, 其错误会记录在 [`dataset::CollectionReport`] 中.
//!   已写入的部分样本不会回滚.
//! 3. 同一时刻内存中至多存在一次扫描的数据.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D 扫描基础数据结构与读取.
pub mod data;

pub mod consts;
pub mod dataset;
pub mod error;
pub mod partition;
pub mod prelude;
pub mod select;
pub mod transform;

pub use data::{NiftiReader, View, VolumePair, VolumeReader};
pub use error::{CollectError, PersistError, ReadError, VolumeError};
