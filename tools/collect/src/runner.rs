//! 程序运行函数.

use crate::result::RunResult;
use crate::Args;
use cube_berry::dataset::{CollectionConfig, Collector};
use cube_berry::{CollectError, NiftiReader};
use log::info;

/// 读取配置, 应用命令行覆盖项, 然后构建数据集合.
pub fn run(args: Args) -> Result<RunResult, CollectError> {
    info!("Loading configuration `{}`...", args.config.display());
    let mut config = CollectionConfig::from_json_file(&args.config)?;
    if let Some(d) = args.niftii_dir {
        config.niftii_dir = d;
    }
    if let Some(d) = args.dataset_dir {
        config.dataset_dir = d;
    }
    if let Some(name) = args.collection_name {
        config.collection_name = name;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let collector = Collector::new(config, NiftiReader)?;
    info!("Writing collection to `{}`", collector.layout().root().display());
    collector.run().map(RunResult::from)
}
