//! 数据集划分: train / valid / test.

use crate::consts::{DEFAULT_HELD_OUT, DEFAULT_TEST_OF_HELD_OUT};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::fmt;

/// 数据集分组.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Group {
    /// 训练集.
    Train,

    /// 验证集.
    Valid,

    /// 测试集.
    Test,
}

impl Group {
    /// 全部分组, 按 train, valid, test 顺序.
    pub const ALL: [Group; 3] = [Group::Train, Group::Valid, Group::Test];

    /// 分组对应的目录名.
    #[inline]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Group::Train => "train",
            Group::Valid => "valid",
            Group::Test => "test",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// 数据集划分方式. 两种方式互斥, 由扫描清单的形式决定.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SplitMode {
    /// 切分前按扫描预先分组, 不调用划分器.
    ByScan,

    /// 所有扫描处理完毕后, 按样本随机划分.
    BySample,
}

/// 两阶段划分比例.
///
/// 先留出 `held_out` 比例的样本, 再将留出样本中 `test_of_held_out` 比例划入测试集,
/// 其余划入验证集. 默认为 80% / 20%, 然后 75% / 25%, 即净比例 80 : 15 : 5.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawSplitSpec")]
pub struct SplitSpec {
    held_out: f64,
    test_of_held_out: f64,
}

#[derive(Deserialize)]
struct RawSplitSpec {
    held_out: f64,
    test_of_held_out: f64,
}

impl TryFrom<RawSplitSpec> for SplitSpec {
    type Error = String;

    fn try_from(raw: RawSplitSpec) -> Result<Self, Self::Error> {
        Self::new(raw.held_out, raw.test_of_held_out).ok_or_else(|| {
            format!(
                "split fractions must lie in [0, 1], got ({}, {})",
                raw.held_out, raw.test_of_held_out
            )
        })
    }
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self {
            held_out: DEFAULT_HELD_OUT,
            test_of_held_out: DEFAULT_TEST_OF_HELD_OUT,
        }
    }
}

impl SplitSpec {
    /// 构建划分比例.
    ///
    /// 两个比例都必须在 `[0, 1]` 内, 否则返回 `None`.
    pub fn new(held_out: f64, test_of_held_out: f64) -> Option<Self> {
        let valid = |f: f64| (0.0..=1.0).contains(&f);
        (valid(held_out) && valid(test_of_held_out)).then_some(Self {
            held_out,
            test_of_held_out,
        })
    }

    /// 留出比例.
    #[inline]
    pub fn held_out(&self) -> f64 {
        self.held_out
    }

    /// 留出样本中测试集的比例.
    #[inline]
    pub fn test_of_held_out(&self) -> f64 {
        self.test_of_held_out
    }

    /// 对 `n` 个样本, 依次返回 (train, valid, test) 的大小.
    pub fn sizes(&self, n: usize) -> (usize, usize, usize) {
        let held = split_len(n, self.held_out);
        let test = split_len(held, self.test_of_held_out);
        (n - held, held - test, test)
    }
}

/// 按比例 `fraction` 向上取整, 得到被分出部分的大小.
#[inline]
fn split_len(n: usize, fraction: f64) -> usize {
    // 扣除浮点误差, 避免 0.2 * 20 之类的整数结果被多取一个.
    let len = (fraction * n as f64 - 1e-9).ceil().max(0.0) as usize;
    len.min(n)
}

/// 划分结果. 三组互不相交, 并集为全部输入.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Partition<T> {
    /// 训练集.
    pub train: Vec<T>,

    /// 验证集.
    pub valid: Vec<T>,

    /// 测试集.
    pub test: Vec<T>,
}

impl<T> Partition<T> {
    /// 获取分组 `group` 的内容.
    #[inline]
    pub fn group(&self, group: Group) -> &[T] {
        match group {
            Group::Train => &self.train,
            Group::Valid => &self.valid,
            Group::Test => &self.test,
        }
    }

    /// 依次获取 (train, valid, test) 的大小.
    #[inline]
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.len(), self.valid.len(), self.test.len())
    }

    /// 获取能按 train, valid, test 顺序迭代 (分组, 元素) 的迭代器.
    pub fn into_iter_grouped(self) -> impl Iterator<Item = (Group, T)> {
        let Self { train, valid, test } = self;
        train
            .into_iter()
            .map(|t| (Group::Train, t))
            .chain(valid.into_iter().map(|t| (Group::Valid, t)))
            .chain(test.into_iter().map(|t| (Group::Test, t)))
    }
}

/// 打乱 `items` 后切出 `fraction` 比例 (向上取整) 作为第二部分.
fn shuffle_split<T>(mut items: Vec<T>, fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    let taken = split_len(items.len(), fraction);
    let rest = items.split_off(items.len() - taken);
    (items, rest)
}

/// 按 `spec` 将 `items` 随机划分为 train / valid / test.
///
/// 给定相同的 `seed`, 相同顺序和长度的输入总会得到相同的划分. 两个阶段各自用 `seed`
/// 初始化随机数发生器. 成对数据 (图像, 标注) 应当作为单个元素传入,
/// 以保证二者使用同一排列.
pub fn partition<T>(items: Vec<T>, spec: SplitSpec, seed: u64) -> Partition<T> {
    let (train, held) = shuffle_split(items, spec.held_out, seed);
    let (valid, test) = shuffle_split(held, spec.test_of_held_out, seed);
    Partition { train, valid, test }
}
