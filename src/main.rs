use anyhow::{Context, Result};
use clap::Parser;
use medquiz_gen::utils::logging;
use medquiz_gen::{App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(&cli).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.abort_signal().listen_ctrl_c();
    app.run().await?;

    Ok(())
}
