//! modular-agent 命令行入口
//!
//! 加载配置、初始化日志，然后逐行读取标准输入交给 ModularAgent 处理。
//! 输入 `exit` / `quit` 退出，`/history` 打印最近对话。

use anyhow::Context;
use modular_agent::{config::load_config, observability, Agent, ModularAgent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load configuration")?;

    if cfg.agent.enable_logging {
        observability::init(&cfg.logging);
    }

    let mut agent = ModularAgent::from_app_config(&cfg).context("Failed to create agent")?;
    tracing::info!("Agent '{}' ready", agent.config().name);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(b"> ").await?;
    stdout.flush().await?;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/history" => {
                let recent = agent
                    .short_term()
                    .map(|m| m.recent(cfg.memory.short_term_capacity))
                    .unwrap_or_default();
                stdout.write_all(format!("{recent}\n").as_bytes()).await?;
            }
            _ => {
                let reply = agent.process_message(input, None).await?;
                stdout.write_all(format!("{reply}\n").as_bytes()).await?;
            }
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
