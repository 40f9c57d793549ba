use anyhow::Result;
use clap::Parser;
use order_intake::cli::Cli;
use order_intake::utils::logging;
use order_intake::{run_command, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化并执行命令
    let app = App::initialize(config)?;
    let output = run_command(&app, cli.command).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
