//! 扫描数据加载器.
//!
//! 提供迭代器风格的扫描获取模式. 每次迭代才读取一个扫描,
//! 因此同一时刻内存中至多存在一次扫描的数据.

use crate::data::{VolumePair, VolumeReader};
use crate::dataset::ScanEntry;
use crate::error::ReadError;
use std::path::{Path, PathBuf};

/// 从扫描根目录、扫描清单和文件名创建扫描加载器.
///
/// 对清单中的每个扫描 `name`, 图像和标注分别位于
/// `root/{name}/{image_name}` 与 `root/{name}/{label_name}`.
/// 文件缺失或无法解析时, 加载器在迭代时会返回 `Result::Err`, 并继续迭代后续扫描.
pub fn scan_loader<'a, R: VolumeReader + ?Sized, P: AsRef<Path>>(
    reader: &'a R,
    root: P,
    entries: Vec<ScanEntry<'a>>,
    image_name: &'a str,
    label_name: &'a str,
) -> ScanLoader<'a, R> {
    let mut entries = entries;
    entries.reverse();

    ScanLoader {
        reader,
        path: root.as_ref().to_owned(),
        entries_rev: entries,
        image_name,
        label_name,
    }
}

/// 3D (图像, 标注) 扫描加载器, 并在内部自动拼接文件路径.
pub struct ScanLoader<'a, R: ?Sized> {
    reader: &'a R,
    path: PathBuf,
    entries_rev: Vec<ScanEntry<'a>>,
    image_name: &'a str,
    label_name: &'a str,
}

impl<'a, R: VolumeReader + ?Sized> Iterator for ScanLoader<'a, R> {
    type Item = (ScanEntry<'a>, Result<VolumePair, ReadError>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries_rev.pop()?;

        self.path.push(entry.name);
        let data = VolumePair::open(
            self.reader,
            self.path.join(self.image_name),
            self.path.join(self.label_name),
        );
        self.path.pop();

        Some((entry, data))
    }
}

impl<'a, R: VolumeReader + ?Sized> ExactSizeIterator for ScanLoader<'a, R> {
    #[inline]
    fn len(&self) -> usize {
        self.entries_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::memory::MemoryReader;
    use ndarray::Array3;

    #[test]
    fn test_loader_order_and_errors() {
        let mut reader = MemoryReader::default();
        for name in ["a", "c"] {
            reader.insert(format!("/scans/{name}/t1.nii"), Array3::zeros((2, 2, 2)));
            reader.insert(format!("/scans/{name}/seg.nii"), Array3::zeros((2, 2, 2)));
        }
        let entries = ["a", "b", "c"]
            .into_iter()
            .map(|name| ScanEntry { name, group: None })
            .collect();

        let loader = scan_loader(&reader, "/scans", entries, "t1.nii", "seg.nii");
        assert_eq!(loader.len(), 3);
        let got: Vec<(&str, bool)> = loader.map(|(e, r)| (e.name, r.is_ok())).collect();
        assert_eq!(got, vec![("a", true), ("b", false), ("c", true)]);
    }
}
