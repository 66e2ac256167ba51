use anyhow::{Context, Result};
use clap::Parser;
use playground_automation::{logger, App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置：配置文件 → 环境变量 → 命令行
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    cli.apply(&mut config);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
