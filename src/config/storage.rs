use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the session token is persisted between runs.
/// We differentiate the backends via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Nothing survives the process; useful for tests and one-shot sessions.
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File(FileStorageConfig::default())
    }
}

/// A JSON document on disk holding every stored key.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct FileStorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        FileStorageConfig {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".authsession/storage.json")
}
