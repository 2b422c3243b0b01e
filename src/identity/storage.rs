//! 浏览器存储抽象
//!
//! 会话级存储（sessionStorage）与持久存储（localStorage）都通过
//! `KeyValueStorage` 访问。存储不可用（隐私模式、被禁用）时返回错误，
//! 由调用方决定如何降级。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::errors::{Result, SitepulseError};

/// 键值存储
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// 内存存储，生命周期与进程（标签页）一致
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空全部键（模拟用户清除站点数据）
    pub fn clear(&self) {
        self.data.write().clear();
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}

/// 基于 JSON 文件的持久存储
///
/// 每次写入都会整体落盘，适合键数量很少的场景。
pub struct FileStorage {
    path: PathBuf,
    data: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// 打开存储文件，文件不存在时视为空
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        debug!(
            "FileStorage: opened {} with {} keys",
            path.display(),
            data.len()
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write();
        data.insert(key.to_string(), value.to_string());
        self.persist(&data)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.data.write();
        if data.remove(key).is_some() {
            self.persist(&data)?;
        }
        Ok(())
    }
}

/// 不可用的存储（隐私模式 / 存储被禁用）
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

impl KeyValueStorage for DisabledStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Err(SitepulseError::storage_unavailable(format!(
            "storage disabled, cannot read '{}'",
            key
        )))
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(SitepulseError::storage_unavailable(format!(
            "storage disabled, cannot write '{}'",
            key
        )))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Err(SitepulseError::storage_unavailable(format!(
            "storage disabled, cannot remove '{}'",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("local_storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("device_fingerprint", "1a2b3c").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("device_fingerprint").unwrap(),
            Some("1a2b3c".to_string())
        );
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileStorage::open(&path).err().unwrap();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_disabled_storage_always_fails() {
        let storage = DisabledStorage;
        assert!(storage.get("k").is_err());
        assert!(storage.set("k", "v").is_err());
        assert!(storage.remove("k").is_err());
    }
}
