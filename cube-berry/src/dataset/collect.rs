//! 数据集合构建流程.

use crate::data::{VolumePair, VolumeReader};
use crate::dataset::{
    sample_stem, scan_loader, CollectionConfig, CollectionLayout, CollectionReport, SampleWriter, ScanEntry,
    ScanOutcome, ScanStats,
};
use crate::error::CollectError;
use crate::partition::{partition, Group, SplitMode};
use crate::select::{classify, select_indices};
use crate::transform::{max_value, normalize_by, tile, zoom_factors};
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

/// 数据集合构建器.
///
/// 按扫描清单顺序逐个处理扫描: 读取, 视图置换, 重采样, 生成掩码, 切分, 筛选,
/// 归一化, 写入. 同一时刻只持有一次扫描的数据. 单个扫描失败只会被记录,
/// 不会中断整个流程.
pub struct Collector<R> {
    config: CollectionConfig,
    reader: R,
    layout: CollectionLayout,
    writer: SampleWriter,
}

impl<R: VolumeReader> Collector<R> {
    /// 检查配置并创建构建器. 不会触碰文件系统.
    pub fn new(config: CollectionConfig, reader: R) -> Result<Self, CollectError> {
        config.validate()?;
        let layout = CollectionLayout::new(config.collection_dir());
        let writer = SampleWriter::new(config.input_shape.mode());
        Ok(Self {
            config,
            reader,
            layout,
            writer,
        })
    }

    /// 输出目录布局.
    #[inline]
    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }

    /// 构建数据集合.
    ///
    /// **注意**: 已存在的数据集合目录会被整体删除, 且不可恢复.
    ///
    /// 只有目录操作失败或按样本划分失败时才返回 `Err`; 单个扫描的失败记录在结果中.
    /// 失败扫描留下的不成对样本不参与划分, 留在扁平目录中并记录在结果中.
    pub fn run(&self) -> Result<CollectionReport, CollectError> {
        let root = self.layout.root();
        if self.layout.reset()? {
            warn!("Removed existing collection `{}`", root.display());
        }
        info!(
            "Creating collection `{}` ({} samples of {} per scan)...",
            root.display(),
            self.config.blocks_per_scan(),
            self.config.input_shape
        );

        let split_mode = self.config.scans.split_mode();
        match split_mode {
            SplitMode::BySample => {
                self.layout.ensure_dirs(None)?;
            }
            SplitMode::ByScan => {
                for group in Group::ALL {
                    self.layout.ensure_dirs(Some(group))?;
                }
            }
        }

        let mut report = CollectionReport::new(root);
        let entries = self.config.scans.entries();
        let total = entries.len();
        let loader = scan_loader(
            &self.reader,
            &self.config.niftii_dir,
            entries,
            &self.config.niftii_images,
            &self.config.niftii_labels,
        );
        for (idx, (entry, data)) in loader.enumerate() {
            info!("[{}/{total}] Processing scan `{}`...", idx + 1, entry.name);
            let start = Instant::now();
            let result = data
                .map_err(CollectError::from)
                .and_then(|pair| self.process_scan(entry, pair))
                .map(|stats| ScanStats {
                    elapsed: start.elapsed(),
                    ..stats
                });
            match &result {
                Ok(stats) => info!(
                    "Scan `{}`: kept {} of {} samples",
                    entry.name, stats.kept, stats.candidates
                ),
                Err(e) => error!("Scan `{}` failed: {e}", entry.name),
            }
            report.push(ScanOutcome {
                scan: entry.name.to_string(),
                group: entry.group,
                result: result.map_err(|e| e.to_string()),
            });
        }

        if split_mode == SplitMode::BySample {
            let (sizes, unpaired) = self.redistribute()?;
            let (train, valid, test) = sizes;
            info!("Split samples: train {train}, valid {valid}, test {test}");
            report.set_partition(sizes);
            report.set_unpaired(unpaired);
        }
        Ok(report)
    }

    /// 处理单个扫描, 把保留的样本写入 `entry` 所在组 (或扁平布局) 的目录.
    fn process_scan(&self, entry: ScanEntry<'_>, pair: VolumePair) -> Result<ScanStats, CollectError> {
        debug!(
            "Scan `{}`: image {:?}, label {:?}",
            entry.name,
            pair.image.dim(),
            pair.label.dim()
        );
        let pair = pair.with_view(self.config.view);
        let source = pair.dim()?;
        debug!(
            "Scan `{}`: zoom {:?} to {:?}",
            entry.name,
            zoom_factors(source, self.config.scan_shape),
            self.config.scan_shape
        );
        let pair = pair.resample(self.config.scan_shape)?;

        let mask = pair.mask(&self.config.labels, self.config.invert);
        let block = self.config.input_shape;
        let labels = tile(mask.view(), block)?;
        let images = tile(pair.image(), block)?;
        let reference = self.config.normalize.reference_max(pair.image());
        drop(mask);

        let policy = self.config.retention_for(entry.group);
        let kept = select_indices(labels.iter().map(|b| b.view()), policy);

        let (images_dir, labels_dir) = self.layout.ensure_dirs(entry.group)?;
        let total = labels.len();
        let mut foreground = 0;
        for &index in kept.iter() {
            let label = labels[index].view();
            if classify(&label).is_foreground() {
                foreground += 1;
            }
            let image = images[index].view();
            let image = normalize_by(image, reference.unwrap_or_else(|| max_value(image)));

            let stem = sample_stem(entry.name, index, total);
            self.writer.write(&images_dir, &stem, image.view())?;
            self.writer.write(&labels_dir, &stem, label)?;
        }

        Ok(ScanStats {
            candidates: total,
            kept: kept.len(),
            foreground,
            ..ScanStats::default()
        })
    }

    /// 将扁平布局中的样本按 (图像, 标注) 成对随机划分, 并移动到各组目录.
    ///
    /// 返回 (train, valid, test) 的大小, 以及缺少标注而未参与划分的样本名.
    /// 扁平目录只在清空后才会删除.
    fn redistribute(&self) -> Result<((usize, usize, usize), Vec<String>), CollectError> {
        let images_dir = self.layout.images_dir(None);
        let labels_dir = self.layout.labels_dir(None);
        let ext = self.writer.extension();

        let mut stems = Vec::new();
        for item in fs::read_dir(&images_dir)? {
            let path = item?.path();
            if path.extension().map_or(false, |e| e == ext) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_owned());
                }
            }
        }
        // 目录遍历顺序与平台相关, 排序后划分才可复现.
        stems.sort_unstable();
        let (stems, unpaired): (Vec<String>, Vec<String>) = stems
            .into_iter()
            .partition(|stem| labels_dir.join(format!("{stem}.{ext}")).is_file());
        for stem in unpaired.iter() {
            warn!("Sample `{stem}` has no matching label, left in `{}`", images_dir.display());
        }

        let parts = partition(stems, self.config.split, self.config.seed);
        let sizes = parts.sizes();
        for group in Group::ALL {
            self.layout.ensure_dirs(Some(group))?;
        }
        for (group, stem) in parts.into_iter_grouped() {
            let name = format!("{stem}.{ext}");
            fs::rename(images_dir.join(&name), self.layout.images_dir(Some(group)).join(&name))?;
            fs::rename(labels_dir.join(&name), self.layout.labels_dir(Some(group)).join(&name))?;
        }
        for dir in [images_dir, labels_dir] {
            if !remove_if_empty(&dir)? {
                warn!("Leftover files kept in `{}`", dir.display());
            }
        }
        Ok((sizes, unpaired))
    }
}

/// 目录为空时删除它. 返回是否已删除.
fn remove_if_empty(dir: &Path) -> io::Result<bool> {
    if fs::read_dir(dir)?.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reader::memory::MemoryReader;
    use crate::dataset::{IMAGES_DIR, LABELS_DIR};
    use crate::error::ReadError;
    use ndarray::{s, Array3};
    use ndarray_npy::read_npy;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    /// 图像值为 `1 + 第 0 轴坐标`; 标注只有第 0 轴坐标为 `fg` 的切片为 1.
    fn scan(shape: (usize, usize, usize), fg: usize) -> (Array3<f32>, Array3<f32>) {
        let image = Array3::from_shape_fn(shape, |(i, _, _)| 1.0 + i as f32);
        let mut label = Array3::zeros(shape);
        label.slice_mut(s![fg, .., ..]).fill(1.0);
        (image, label)
    }

    fn reader_with(root: &Path, scans: &[(&str, (usize, usize, usize), usize)]) -> MemoryReader {
        let mut reader = MemoryReader::default();
        for &(name, shape, fg) in scans {
            let (image, label) = scan(shape, fg);
            reader.insert(root.join(name).join("t1.nii.gz"), image);
            reader.insert(root.join(name).join("seg.nii.gz"), label);
        }
        reader
    }

    fn config(root: &Path, out: &Path, scans: &str, scan_shape: &str, block: &str) -> CollectionConfig {
        let s = format!(
            r#"{{
                "niftii_dir": {:?},
                "niftii_labels": "seg.nii.gz",
                "niftii_images": "t1.nii.gz",
                "dataset_dir": {:?},
                "collection_name": "c",
                "scan_shape": {scan_shape},
                "input_shape": {block},
                "labels": [1.0],
                "scans": {scans}
            }}"#,
            root.to_str().unwrap(),
            out.to_str().unwrap(),
        );
        CollectionConfig::from_json_str(&s).unwrap()
    }

    /// 读取 `trigger` 时在 `plant` 处创建目录, 使之后写入同名文件失败.
    struct BlockingReader {
        inner: MemoryReader,
        trigger: PathBuf,
        plant: PathBuf,
    }

    impl VolumeReader for BlockingReader {
        fn read(&self, path: &Path) -> Result<Array3<f32>, ReadError> {
            if path == self.trigger {
                fs::create_dir_all(&self.plant).unwrap();
            }
            self.inner.read(path)
        }
    }

    fn stems_in(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path().file_stem().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_grouped_2d() {
        let tmp = tempfile::tempdir().unwrap();
        let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
        // 12 个切片, 只有第 5 个切片含前景.
        let reader = reader_with(&root, &[("a", (12, 4, 4), 5), ("t", (12, 4, 4), 5)]);
        let config = config(
            &root,
            &out,
            r#"{"train": ["a"], "test": ["t"]}"#,
            "[12, 4, 4]",
            "[1, 4, 4]",
        );

        // 旧的数据集合会被删除.
        fs::create_dir_all(out.join("c")).unwrap();
        fs::write(out.join("c").join("stale.txt"), b"old").unwrap();

        let collector = Collector::new(config, reader).unwrap();
        let report = collector.run().unwrap();
        assert!(!out.join("c").join("stale.txt").exists());
        assert_eq!(report.partition(), None);
        // 没有扫描的组也有完整的目录树.
        assert!(out.join("c/valid").join(IMAGES_DIR).is_dir());
        assert!(out.join("c/valid").join(LABELS_DIR).is_dir());

        // 训练组: 前景切片 5, 以及背景计数为 0 和 10 的切片 0 和切片 11.
        let train = &report.scans()[0];
        assert_eq!(train.group, Some(Group::Train));
        let stats = train.result.as_ref().unwrap();
        assert_eq!((stats.candidates, stats.kept, stats.foreground), (12, 3, 1));
        let expected: BTreeSet<String> = ["a_000", "a_005", "a_011"].iter().map(|s| s.to_string()).collect();
        assert_eq!(stems_in(&out.join("c/train").join(IMAGES_DIR)), expected);
        assert_eq!(stems_in(&out.join("c/train").join(LABELS_DIR)), expected);

        // 测试组保留全部切片.
        let stats = report.scans()[1].result.as_ref().unwrap();
        assert_eq!((stats.candidates, stats.kept), (12, 12));
        assert_eq!(stems_in(&out.join("c/test").join(IMAGES_DIR)).len(), 12);

        // 每个切片按自身最大值归一化到 255; 掩码保持 {0, 255}.
        let img = image::open(out.join("c/train/images/a_005.png")).unwrap().into_luma8();
        assert_eq!(img.dimensions(), (4, 4));
        assert!(img.pixels().all(|p| p.0 == [255]));
        let mask = image::open(out.join("c/train/labels/a_005.png")).unwrap().into_luma8();
        assert!(mask.pixels().all(|p| p.0 == [255]));
        let mask = image::open(out.join("c/train/labels/a_000.png")).unwrap().into_luma8();
        assert!(mask.pixels().all(|p| p.0 == [0]));
    }

    #[test]
    fn test_flat_3d_split() {
        let tmp = tempfile::tempdir().unwrap();
        let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
        let names = ["s0", "s1", "s2", "s3", "s4"];
        let scans: Vec<_> = names.iter().map(|&n| (n, (4, 4, 4), 1)).collect();
        let reader = reader_with(&root, &scans);
        let mut config = config(
            &root,
            &out,
            r#"["s0", "s1", "s2", "s3", "s4"]"#,
            "[4, 4, 4]",
            "[2, 2, 2]",
        );
        config.only_masks = false;

        let report = Collector::new(config, reader).unwrap().run().unwrap();
        assert_eq!(report.kept_total(), 40);
        assert_eq!(report.partition(), Some((32, 6, 2)));
        assert!(!out.join("c").join(IMAGES_DIR).exists());
        assert!(!out.join("c").join(LABELS_DIR).exists());

        let mut all = BTreeSet::new();
        for group in Group::ALL {
            let dir = out.join("c").join(group.dir_name());
            let images = stems_in(&dir.join(IMAGES_DIR));
            assert_eq!(images, stems_in(&dir.join(LABELS_DIR)));
            for stem in images {
                assert!(all.insert(stem));
            }
        }
        assert_eq!(all.len(), 40);

        // 3D 样本保存为 npy, 形状与块形状一致.
        let sample: Array3<u8> = read_npy(out.join("c/train/images").join(format!(
            "{}.npy",
            stems_in(&out.join("c/train/images")).iter().next().unwrap()
        )))
        .unwrap();
        assert_eq!(sample.dim(), (2, 2, 2));
    }

    #[test]
    fn test_flat_split_reproducible() {
        let run = |seed: u64| {
            let tmp = tempfile::tempdir().unwrap();
            let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
            let reader = reader_with(&root, &[("a", (20, 2, 2), 3)]);
            let mut config = config(&root, &out, r#"["a"]"#, "[20, 2, 2]", "[1, 2, 2]");
            config.only_masks = false;
            config.seed = seed;
            Collector::new(config, reader).unwrap().run().unwrap();
            stems_in(&out.join("c/test/images"))
        };
        assert_eq!(run(42), run(42));
        assert_eq!(run(42).len(), 1);
    }

    #[test]
    fn test_failed_scan_continues() {
        let tmp = tempfile::tempdir().unwrap();
        let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
        let reader = reader_with(&root, &[("a", (4, 4, 4), 0), ("c", (4, 4, 4), 3)]);
        let config = config(&root, &out, r#"["a", "missing", "c"]"#, "[4, 4, 4]", "[4, 4, 1]");

        let report = Collector::new(config, reader).unwrap().run().unwrap();
        assert_eq!(report.scans().len(), 3);
        let failed: Vec<&str> = report.failed().map(|s| s.scan.as_str()).collect();
        assert_eq!(failed, vec!["missing"]);
        assert!(report.scans()[2].is_ok());
    }

    #[test]
    fn test_scan_failed_mid_write() {
        let tmp = tempfile::tempdir().unwrap();
        let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
        // 读取 `b` 时占据其第一个标注样本的路径: 图像写入成功, 标注写入失败.
        let reader = BlockingReader {
            inner: reader_with(&root, &[("a", (4, 2, 2), 1), ("b", (4, 2, 2), 2)]),
            trigger: root.join("b").join("t1.nii.gz"),
            plant: out.join("c").join(LABELS_DIR).join("b_000.png"),
        };
        let mut config = config(&root, &out, r#"["a", "b"]"#, "[4, 2, 2]", "[1, 2, 2]");
        config.only_masks = false;

        let report = Collector::new(config, reader).unwrap().run().unwrap();
        let failed: Vec<&str> = report.failed().map(|s| s.scan.as_str()).collect();
        assert_eq!(failed, vec!["b"]);
        assert_eq!(report.kept_total(), 4);
        assert_eq!(report.partition(), Some((3, 0, 1)));
        assert_eq!(report.unpaired(), ["b_000".to_string()]);
        assert!(report.to_string().contains("Unpaired samples left in flat layout: b_000"));

        // 成对样本全部划分完毕, 不成对的样本留在扁平目录中.
        let mut split = BTreeSet::new();
        for group in Group::ALL {
            let dir = out.join("c").join(group.dir_name());
            let images = stems_in(&dir.join(IMAGES_DIR));
            assert_eq!(images, stems_in(&dir.join(LABELS_DIR)));
            split.extend(images);
        }
        let expected: BTreeSet<String> = (0..4).map(|i| format!("a_{i:03}")).collect();
        assert_eq!(split, expected);
        assert!(out.join("c").join(IMAGES_DIR).join("b_000.png").is_file());
        assert!(out.join("c").join(LABELS_DIR).join("b_000.png").is_dir());
    }

    #[test]
    fn test_resampled_scan() {
        let tmp = tempfile::tempdir().unwrap();
        let (root, out) = (tmp.path().join("niftii"), tmp.path().join("out"));
        // (3, 2, 2) 的体积被重采样到 (6, 4, 4), 整体作为唯一样本.
        let reader = reader_with(&root, &[("v", (3, 2, 2), 1)]);
        let config = config(
            &root,
            &out,
            r#"{"valid": ["v"]}"#,
            "[6, 4, 4]",
            "[6, 4, 4]",
        );

        let report = Collector::new(config, reader).unwrap().run().unwrap();
        let stats = report.scans()[0].result.as_ref().unwrap();
        assert_eq!((stats.candidates, stats.kept, stats.foreground), (1, 1, 1));

        let label: Array3<u8> = read_npy(out.join("c/valid/labels/v.npy")).unwrap();
        assert_eq!(label.dim(), (6, 4, 4));
        assert_eq!(label.iter().filter(|&&p| p == 255).count(), 2 * 16);
    }
}
