//! 数据集合目录布局.
//!
//! ```text
//! {root}/images, {root}/labels                  按样本划分前的扁平布局
//! {root}/{train, valid, test}/{images, labels}  最终布局
//! ```

use crate::partition::Group;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 图像子目录名.
pub const IMAGES_DIR: &str = "images";

/// 标注子目录名.
pub const LABELS_DIR: &str = "labels";

/// 数据集合的根目录及其子目录.
#[derive(Clone, Debug)]
pub struct CollectionLayout {
    root: PathBuf,
}

impl CollectionLayout {
    /// 以 `root` 为数据集合根目录.
    #[inline]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    /// 数据集合根目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 组 `group` 的某个子目录. `group` 为 `None` 时为扁平布局.
    fn group_dir(&self, group: Option<Group>, kind: &str) -> PathBuf {
        let mut ans = self.root.clone();
        if let Some(g) = group {
            ans.push(g.dir_name());
        }
        ans.push(kind);
        ans
    }

    /// 图像目录.
    #[inline]
    pub fn images_dir(&self, group: Option<Group>) -> PathBuf {
        self.group_dir(group, IMAGES_DIR)
    }

    /// 标注目录.
    #[inline]
    pub fn labels_dir(&self, group: Option<Group>) -> PathBuf {
        self.group_dir(group, LABELS_DIR)
    }

    /// 创建 (若不存在) 组 `group` 的图像和标注目录, 并依次返回它们.
    pub fn ensure_dirs(&self, group: Option<Group>) -> io::Result<(PathBuf, PathBuf)> {
        let images = self.images_dir(group);
        let labels = self.labels_dir(group);
        fs::create_dir_all(&images)?;
        fs::create_dir_all(&labels)?;
        Ok((images, labels))
    }

    /// 删除已存在的根目录 (**不可恢复**), 然后重新创建空的根目录.
    ///
    /// 返回值指示是否删除了旧目录.
    pub fn reset(&self) -> io::Result<bool> {
        let existed = self.root.exists();
        if existed {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(existed)
    }
}
