use anyhow::{Context, Result};
use dylive::config::ConfigManager;
use dylive::logger::{init_logger, log_app_start, set_log_level};
use dylive::HttpClient;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "dylive", about = "抖音直播间信息查询")]
struct Opt {
    /// 配置文件路径
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// 按主页路径查询主播及其直播间
    #[structopt(name = "user")]
    User { name: String },

    /// 按分享页地址查询直播间
    #[structopt(name = "room")]
    Room { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::from_args();

    let config_path = opt
        .config
        .unwrap_or_else(ConfigManager::default_config_path);
    let manager = ConfigManager::new(config_path.clone())
        .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;
    let config = manager.config();

    if let Some(level) = config.log.level {
        set_log_level(level)?;
    }
    init_logger()?;
    log_app_start(env!("CARGO_PKG_VERSION"));

    let client = HttpClient::from_config(config).context("无法创建客户端")?;

    let output = match opt.command {
        Command::User { name } => {
            let user = client
                .fetch_user_by_name(&name)
                .await
                .with_context(|| format!("查询主播失败: {name}"))?;
            serde_json::to_string_pretty(&user)?
        }
        Command::Room { url } => {
            let room = client
                .fetch_room_by_url(&url)
                .await
                .with_context(|| format!("查询直播间失败: {url}"))?;
            serde_json::to_string_pretty(&room)?
        }
    };

    println!("{output}");

    Ok(())
}
