//! 牌桌 actor：独占 GameEngine，指令从 mpsc 队列进入，通知从 broadcast 发出。
//!
//! 引擎本身是同步的，延迟结算由这里的 tokio 定时器驱动虚拟时钟完成。

use hilo_core::{Command, GameEngine, Notification};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

/// 牌桌句柄，用于发送指令和订阅通知
#[derive(Clone)]
pub struct TableHandle {
    cmd_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<Notification>,
}

impl TableHandle {
    pub async fn send(&self, command: Command) -> Result<(), String> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| "牌桌已关闭".to_string())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.event_tx.subscribe()
    }
}

pub struct Table {
    engine: GameEngine,
    inbox: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<Notification>,
}

impl Table {
    /// 创建牌桌。先用句柄订阅，再调用 [`Table::spawn`]，就不会漏掉开局的通知。
    pub fn new(engine: GameEngine) -> (Self, TableHandle) {
        let (cmd_tx, inbox) = mpsc::channel(32);
        let (event_tx, _) = broadcast::channel(128);
        let handle = TableHandle { cmd_tx, event_tx: event_tx.clone() };
        (Table { engine, inbox, event_tx }, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let started = Instant::now();
        info!(game_id = %self.engine.state().game_id, "牌桌开始运行");

        self.publish(Notification::Render(self.engine.view()));
        self.flush();

        loop {
            let due = self.engine.next_due_ms();
            tokio::select! {
                command = self.inbox.recv() => {
                    let Some(command) = command else { break };
                    self.engine.advance_to(elapsed_ms(started));
                    if let Err(e) = self.engine.handle(command) {
                        debug!(?command, "指令被拒绝: {}", e);
                    }
                }
                _ = sleep_until_due(started, due) => {
                    self.engine.advance_to(elapsed_ms(started));
                }
            }
            self.flush();
        }
        info!("所有句柄都已关闭，牌桌停止");
    }

    /// 把引擎发件箱里的通知按顺序广播出去
    fn flush(&mut self) {
        for notification in self.engine.drain_notifications() {
            self.publish(notification);
        }
    }

    fn publish(&self, notification: Notification) {
        // 没有订阅者时发送会失败，这不是错误
        let _ = self.event_tx.send(notification);
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

async fn sleep_until_due(started: Instant, due: Option<u64>) {
    match due {
        Some(ms) => tokio::time::sleep_until(started + Duration::from_millis(ms)).await,
        None => std::future::pending::<()>().await,
    }
}
