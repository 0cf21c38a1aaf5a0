use crate::error::PersistenceError;

/// 唯一的存档槽位名，同一时间只保存"当前这一局"
pub const CURRENT_GAME_SLOT: &str = "currentGame";

/// 存档层。引擎只产出序列化后的字符串，存到哪里由实现决定。
pub trait Persistence {
    fn save_game(&mut self, state: &str) -> Result<(), PersistenceError>;
    fn load_game(&self) -> Result<Option<String>, PersistenceError>;
    fn clear_game(&mut self) -> Result<(), PersistenceError>;
}

/// 内存存档，测试和不需要落盘的场景使用
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn save_game(&mut self, state: &str) -> Result<(), PersistenceError> {
        self.slot = Some(state.to_string());
        Ok(())
    }

    fn load_game(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.slot.clone())
    }

    fn clear_game(&mut self) -> Result<(), PersistenceError> {
        self.slot = None;
        Ok(())
    }
}
