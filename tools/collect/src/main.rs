//! 数据集合构建命令行工具.
//!
//! ```text
//! collect -c wmh.json
//! collect -c wmh.json --dataset-dir /data/processed --seed 7 -v
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod result;
mod runner;

/// 将成对的 3D 医学扫描 (图像 + 标注) 转换为 2D / 3D 训练样本数据集合.
///
/// **注意**: 目标数据集合目录若已存在, 将被整体删除.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// JSON 配置文件路径.
    #[arg(short, long)]
    config: PathBuf,

    /// 覆盖配置中的扫描根目录.
    #[arg(long)]
    niftii_dir: Option<PathBuf>,

    /// 覆盖配置中的输出根目录.
    #[arg(short = 'D', long)]
    dataset_dir: Option<PathBuf>,

    /// 覆盖配置中的数据集合名.
    #[arg(short = 'n', long)]
    collection_name: Option<String>,

    /// 覆盖配置中按样本划分时的随机种子.
    #[arg(short, long)]
    seed: Option<u64>,

    /// 输出 debug 级别日志.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = utils::init_logger(args.verbose) {
        eprintln!("Failed to initialize logger: {e}");
        return ExitCode::FAILURE;
    }

    match runner::run(args) {
        Ok(report) => {
            report.print();
            if report.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
