//! 运行结果.

use cube_berry::dataset::CollectionReport;

/// 数据集合构建的最终结果.
pub struct RunResult {
    report: CollectionReport,
}

impl From<CollectionReport> for RunResult {
    #[inline]
    fn from(report: CollectionReport) -> Self {
        Self { report }
    }
}

impl RunResult {
    /// 是否所有扫描都处理成功.
    #[inline]
    pub fn all_ok(&self) -> bool {
        self.report.failed().next().is_none()
    }

    /// 打印运行结果.
    pub fn print(&self) {
        utils::sep();
        println!("{}", self.report);
        utils::sep();

        if !self.all_ok() {
            println!("Failed scans (partial output may remain on disk):");
            for s in self.report.failed() {
                if let Err(e) = &s.result {
                    println!("    {}: {e}", s.scan);
                }
            }
            utils::sep();
        }
    }
}
