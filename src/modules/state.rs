use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::error::StoreError;
use crate::modules::files;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Initialized,
    Running,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub status: Status,
    pub last_tick: u64,
    pub message: Option<String>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            status: Status::Initialized,
            last_tick: 0,
            message: None,
        }
    }
}

pub fn state_file_path(dir: &Path) -> PathBuf {
    dir.join("state.json")
}

pub fn init_state(dir: &Path) -> Result<RuntimeState, StoreError> {
    let state = RuntimeState::default();
    save_state(dir, &state)?;
    Ok(state)
}

pub fn load_state(dir: &Path) -> Result<Option<RuntimeState>, StoreError> {
    files::load(&state_file_path(dir))
}

pub fn save_state(dir: &Path, state: &RuntimeState) -> Result<(), StoreError> {
    files::save(&state_file_path(dir), state)
}

pub fn set_status(
    dir: &Path,
    status: Status,
    last_tick: u64,
    message: Option<String>,
) -> Result<RuntimeState, StoreError> {
    let mut state = load_state(dir)?.unwrap_or_default();
    state.status = status;
    state.last_tick = last_tick;
    state.message = message;
    save_state(dir, &state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_status_creates_and_updates_state() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_state(dir.path()).unwrap(), None);

        set_status(dir.path(), Status::Running, 4, Some("tick 4".into())).unwrap();
        let state = set_status(dir.path(), Status::Stopped, 5, None).unwrap();

        assert_eq!(load_state(dir.path()).unwrap(), Some(state));
        assert_eq!(
            load_state(dir.path()).unwrap().map(|s| (s.status, s.last_tick)),
            Some((Status::Stopped, 5))
        );
    }
}
