//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 二值掩码中, 背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值掩码中, 前景的像素值.
    pub const MASK_FOREGROUND: u8 = 255;

    /// 像素是否是前景?
    ///
    /// 与 "块内最大值大于 0" 的判定保持一致, 因此任何非零像素都视为前景.
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != MASK_BACKGROUND
    }
}

/// 稀疏背景保留策略中, 每 `BACKGROUND_KEEP_PERIOD` 个纯背景样本保留一个.
pub const BACKGROUND_KEEP_PERIOD: u64 = 10;

/// 默认随机种子. 划分数据集时使用.
pub const DEFAULT_SEED: u64 = 42;

/// 默认留出比例: 20% 的样本不进入训练集.
pub const DEFAULT_HELD_OUT: f64 = 0.2;

/// 默认测试集在留出样本中的比例: 留出样本的 25% 进入测试集, 其余进入验证集.
pub const DEFAULT_TEST_OF_HELD_OUT: f64 = 0.25;

/// 体素/像素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// `MASK_BACKGROUND`, 代表背景.
    Background,

    /// `MASK_FOREGROUND`, 代表前景.
    Foreground,
}

impl ElemType {
    /// 根据掩码像素值判定类型.
    #[inline]
    pub const fn of(p: u8) -> Self {
        if gray::is_foreground(p) {
            Self::Foreground
        } else {
            Self::Background
        }
    }

    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }
}
