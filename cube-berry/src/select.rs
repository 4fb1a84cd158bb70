//! 样本保留策略.
//!
//! 选择器按切分顺序逐个评估一次扫描的所有候选样本. 背景计数器是显式传入传出的折叠值,
//! 每次扫描从 0 开始, 不按组重置, 也不存在任何全局状态.

use crate::consts::{ElemType, BACKGROUND_KEEP_PERIOD};
use ndarray::{ArrayView, Dimension};

/// 样本保留策略.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RetentionPolicy {
    /// 无条件保留所有样本.
    All,

    /// 保留所有含前景的样本, 纯背景样本只保留约十分之一.
    SparseBackground,

    /// 设第一个与最后一个含前景样本的序号分别为 `first` 和 `last`,
    /// 则序号落在 `[first - offset, last + offset]` 内的样本全部保留,
    /// 窗口外的纯背景样本只保留约十分之一. 没有任何前景时等同于 `SparseBackground`.
    MaskWindow {
        /// 窗口向两侧扩展的样本个数.
        offset: usize,
    },
}

impl RetentionPolicy {
    /// 从 "只保留含掩码样本" 开关得到策略.
    #[inline]
    pub const fn from_only_masks(only_masks: bool) -> Self {
        if only_masks {
            Self::SparseBackground
        } else {
            Self::All
        }
    }
}

/// 一次扫描内已遇到的 (窗口外) 纯背景样本个数.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BackgroundCounter(u64);

impl BackgroundCounter {
    /// 从 0 开始计数.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// 当前计数.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// 样本的类型: 块内最大值大于 0 时为前景, 否则为背景.
#[inline]
pub fn classify<D: Dimension>(label: &ArrayView<'_, u8, D>) -> ElemType {
    if label.iter().any(|&p| ElemType::of(p).is_foreground()) {
        ElemType::Foreground
    } else {
        ElemType::Background
    }
}

/// 前景窗口 `[first - offset, last + offset]` (闭区间, 下界截断到 0).
/// 不存在前景样本时返回 `None`.
pub fn mask_window(types: &[ElemType], offset: usize) -> Option<(usize, usize)> {
    let first = types.iter().position(ElemType::is_foreground)?;
    let last = types.iter().rposition(ElemType::is_foreground)?;
    Some((first.saturating_sub(offset), last.saturating_add(offset)))
}

/// 判断已分类的样本是否保留, 并返回更新后的计数器.
fn decide(
    elem: ElemType,
    in_window: bool,
    policy: RetentionPolicy,
    counter: BackgroundCounter,
) -> (bool, BackgroundCounter) {
    match policy {
        RetentionPolicy::All => (true, counter),
        RetentionPolicy::SparseBackground | RetentionPolicy::MaskWindow { .. } => {
            if elem.is_foreground() || in_window {
                (true, counter)
            } else {
                let kept = counter.0 % BACKGROUND_KEEP_PERIOD == 0;
                (kept, BackgroundCounter(counter.0 + 1))
            }
        }
    }
}

/// 判断单个标注样本是否保留, 并返回更新后的计数器.
///
/// 稀疏背景策略下的计数顺序固定为 **先检查, 后自增**: 纯背景样本在
/// `counter % 10 == 0` 时保留, 然后无论是否保留, 计数器都加 1.
/// 因此计数从 0 开始时, 遇到的第一个纯背景样本总会被保留.
///
/// `MaskWindow` 的窗口依赖整个扫描, 只由 [`select_indices`] 计算;
/// 单独调用时样本视为位于窗口外.
pub fn keep<D: Dimension>(
    label: ArrayView<'_, u8, D>,
    policy: RetentionPolicy,
    counter: BackgroundCounter,
) -> (bool, BackgroundCounter) {
    decide(classify(&label), false, policy, counter)
}

/// 对一次扫描的全部标注样本 (按切分顺序) 运行选择器, 返回保留的序号.
pub fn select_indices<'a, I, D>(labels: I, policy: RetentionPolicy) -> Vec<usize>
where
    I: IntoIterator<Item = ArrayView<'a, u8, D>>,
    D: Dimension,
{
    let types: Vec<ElemType> = labels.into_iter().map(|l| classify(&l)).collect();
    let window = match policy {
        RetentionPolicy::MaskWindow { offset } => mask_window(&types, offset),
        _ => None,
    };

    let mut counter = BackgroundCounter::new();
    let mut kept = Vec::new();
    for (index, &elem) in types.iter().enumerate() {
        let in_window = window.map_or(false, |(lo, hi)| (lo..=hi).contains(&index));
        let (k, next) = decide(elem, in_window, policy, counter);
        counter = next;
        if k {
            kept.push(index);
        }
    }
    kept
}
