mod config;
mod render;
mod store;
mod table;

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::ClientConfig;
use hilo_core::{Command, EngineConfig, GameEngine, GameError, Guess, Persistence};
use store::FileStore;
use table::Table;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 日志写到 stderr，不和牌桌输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hilo_client=info,hilo_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    info!(save_path = %config.save_path.display(), "读取存档");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut store = FileStore::new(&config.save_path);

    let engine = match load_engine(&store, config.engine) {
        Ok(engine) => engine,
        Err(e) => {
            warn!("无法恢复存档: {}", e);
            // 存档坏了只能由用户确认后清空重开，不做自动修复
            let mut fresh = GameEngine::new(config.engine);
            fresh.error(Some(&e.to_string()));
            fresh.drain_notifications().iter().for_each(render::print_notification);
            print!("(y/n) > ");
            std::io::stdout().flush()?;

            let answer = stdin.next_line().await?.unwrap_or_default();
            if !matches!(answer.trim(), "y" | "yes") {
                println!("存档保持原样，退出。");
                return Ok(());
            }
            store.clear_game()?;
            fresh
        }
    };

    let (table, handle) = Table::new(engine);
    let mut events = handle.subscribe();
    let writer = store::spawn_store_writer(store, handle.subscribe());
    let table_task = table.spawn();

    // 表现层订阅者
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(notification) if render::is_visible(&notification) => {
                    render::print_notification(&notification);
                    print!("> ");
                    let _ = std::io::stdout().flush();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => warn!("界面落后了 {} 条通知", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    print_help();
    loop {
        let Some(line) = stdin.next_line().await? else { break };
        let command = match line.trim() {
            "exit" | "quit" => break,
            "help" | "?" => {
                print_help();
                continue;
            }
            "" => continue,
            other => match parse_command(other) {
                Some(command) => command,
                None => {
                    println!("未知命令: {}", other);
                    continue;
                }
            },
        };
        handle.send(command).await?;
    }

    // 关闭句柄后牌桌停止，存档订阅者把剩下的通知写完再退出
    drop(handle);
    table_task.await?;
    writer.await?;
    println!("已退出，进度已自动保存。");
    Ok(())
}

fn load_engine(store: &FileStore, config: EngineConfig) -> Result<GameEngine, GameError> {
    let saved = store
        .load_game()
        .map_err(|e| GameError::StaleOrCorruptState(e.to_string()))?;
    match saved {
        Some(saved) => GameEngine::restore(config, &saved),
        None => Ok(GameEngine::new(config)),
    }
}

fn parse_command(input: &str) -> Option<Command> {
    match input {
        "draw" | "d" => Some(Command::Draw),
        "hi" | "h" | "higher" => Some(Command::Guess(Guess::Higher)),
        "lo" | "l" | "lower" => Some(Command::Guess(Guess::Lower)),
        "pass" | "p" => Some(Command::Pass),
        "reset" => Some(Command::Reset),
        _ => None,
    }
}

fn print_help() {
    println!("--- Hi-Lo 猜大小 ---");
    println!("可用命令:");
    println!("  draw (d)      - 庄家摸牌");
    println!("  hi (h)        - 猜下一张更大");
    println!("  lo (l)        - 猜下一张更小");
    println!("  pass (p)      - 过牌，与庄家交换角色");
    println!("  reset         - 清空存档，开始新游戏");
    println!("  exit          - 退出");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("d"), Some(Command::Draw));
        assert_eq!(parse_command("hi"), Some(Command::Guess(Guess::Higher)));
        assert_eq!(parse_command("lower"), Some(Command::Guess(Guess::Lower)));
        assert_eq!(parse_command("pass"), Some(Command::Pass));
        assert_eq!(parse_command("reset"), Some(Command::Reset));
        assert_eq!(parse_command("fold"), None);
    }
}
