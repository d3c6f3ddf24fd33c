use std::env;
use std::fs;
use std::path::PathBuf;

use crate::common::{DomainError, DomainResult};
use crate::domains::presence::ProfileStore;

const DISPLAY_NAME_FILE: &str = "display_name";

/// File-backed stand-in for the browser's local storage: one file holding the
/// persisted display name.
pub struct FilesystemProfileStore {
    base: PathBuf,
}

impl FilesystemProfileStore {
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var("PLAZA_PROFILE_DIR") {
                PathBuf::from(v)
            } else {
                PathBuf::from(".plaza")
            }
        });
        Self { base }
    }
}

impl ProfileStore for FilesystemProfileStore {
    fn load_display_name(&self) -> DomainResult<Option<String>> {
        let path = self.base.join(DISPLAY_NAME_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        let name = raw.trim();
        if name.is_empty() {
            Ok(None)
        } else {
            Ok(Some(name.to_string()))
        }
    }

    fn save_display_name(&self, name: &str) -> DomainResult<()> {
        if !self.base.exists() {
            fs::create_dir_all(&self.base)
                .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        }
        fs::write(self.base.join(DISPLAY_NAME_FILE), name)
            .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))
    }
}
