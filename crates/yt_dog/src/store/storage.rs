use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 频道与视频列表的存储键
pub const STORE_KEY: &str = "yt-dog-store";
/// 观看记录的存储键
pub const LEDGER_KEY: &str = "yt-dog:state";

/// 以 JSON 文件保存的键值存储，每个键对应数据目录下的一个文件
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(dir: &Path, key: &str) -> Self {
        Self {
            path: dir.join(format!("{}.json", key.replace(':', "-"))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在时返回 None
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    /// 先写入临时文件再重命名，避免写入中断时留下损坏的文件
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(value)?)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename {}", tmp_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_to_path() {
        let dir = Path::new("/tmp/yt-dog");
        assert_eq!(JsonStorage::new(dir, STORE_KEY).path(), dir.join("yt-dog-store.json"));
        assert_eq!(JsonStorage::new(dir, LEDGER_KEY).path(), dir.join("yt-dog-state.json"));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(&dir.path().join("nested"), "key");
        assert!(storage.load::<Vec<u32>>().unwrap().is_none());
        storage.save(&vec![1u32, 2, 3]).unwrap();
        assert_eq!(storage.load::<Vec<u32>>().unwrap(), Some(vec![1, 2, 3]));
        std::fs::write(storage.path(), "not json").unwrap();
        assert!(storage.load::<Vec<u32>>().is_err());
    }
}
