use crate::models::ThemeMode;
use crate::storage::{SharedStorage, keys, read_json, write_json};

pub struct ThemeState {
    mode: ThemeMode,
    storage: SharedStorage,
}

impl ThemeState {
    pub fn load(storage: SharedStorage) -> Self {
        let mode = read_json(storage.as_ref(), keys::THEME).unwrap_or_default();
        Self { mode, storage }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn set(&mut self, mode: ThemeMode) {
        self.mode = mode;
        write_json(self.storage.as_ref(), keys::THEME, &self.mode);
    }

    pub fn toggle(&mut self) -> ThemeMode {
        self.set(self.mode.toggled());
        self.mode
    }
}
