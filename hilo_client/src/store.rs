use hilo_core::{Notification, Persistence, PersistenceError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 把"当前这一局"存成一个 JSON 文件
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl Persistence for FileStore {
    fn save_game(&mut self, state: &str) -> Result<(), PersistenceError> {
        // 先写临时文件再改名，避免中途退出留下半截存档
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, state)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load_game(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(saved) => Ok(Some(saved)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_game(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// 存档订阅者：只关心 Save 和 Cleared 两类通知
pub fn spawn_store_writer<P>(mut store: P, mut events: broadcast::Receiver<Notification>) -> JoinHandle<()>
where
    P: Persistence + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Notification::Save(state)) => match store.save_game(&state) {
                    Ok(()) => debug!("已存档"),
                    Err(e) => warn!("存档失败: {}", e),
                },
                Ok(Notification::Cleared) => {
                    if let Err(e) = store.clear_game() {
                        warn!("清空存档失败: {}", e);
                    }
                }
                Ok(_) => {}
                // 每次存档都是完整状态，丢掉几条旧的无所谓
                Err(RecvError::Lagged(n)) => warn!("存档订阅者落后了 {} 条通知", n),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("hilo-{}.json", Uuid::new_v4())))
    }

    #[test]
    fn test_file_store_round_trip() {
        let mut store = temp_store();
        assert_eq!(store.load_game().unwrap(), None);

        store.save_game("{\"pot\":3}").unwrap();
        assert_eq!(store.load_game().unwrap().as_deref(), Some("{\"pot\":3}"));

        store.clear_game().unwrap();
        assert_eq!(store.load_game().unwrap(), None);
        // 重复清空不报错
        store.clear_game().unwrap();
    }

    #[tokio::test]
    async fn test_store_writer_follows_notifications() {
        let store = temp_store();
        let (tx, rx) = broadcast::channel(16);
        let writer = spawn_store_writer(store.clone(), rx);

        tx.send(Notification::Save("{\"pot\":1}".to_string())).unwrap();
        tx.send(Notification::Flash(hilo_core::FlashKind::Correct)).unwrap();
        tx.send(Notification::Save("{\"pot\":2}".to_string())).unwrap();
        drop(tx);
        writer.await.unwrap();
        assert_eq!(store.load_game().unwrap().as_deref(), Some("{\"pot\":2}"));

        let (tx, rx) = broadcast::channel(16);
        let writer = spawn_store_writer(store.clone(), rx);
        tx.send(Notification::Cleared).unwrap();
        drop(tx);
        writer.await.unwrap();
        assert_eq!(store.load_game().unwrap(), None);
    }
}
