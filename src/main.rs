use anyhow::{Context, Result};
use quiz_corpus::utils::logging;
use quiz_corpus::{App, Config, RunMode};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let mode = RunMode::from_args(std::env::args().skip(1))?;

    // 初始化并运行应用
    App::initialize(config).run(mode).await?;

    Ok(())
}
