//! 书目与进度 JSON 文件的读写。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub type JsonObject = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid json at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path} must contain a json object")]
    NotAnObject { path: PathBuf },
}

/// 文件不存在时返回空对象（视为“尚未配置”）；格式错误则报错。
pub fn load(path: &Path) -> Result<JsonObject, StoreError> {
    if !path.exists() {
        return Ok(JsonObject::new());
    }

    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// 以两空格缩进整体覆盖写入，非 ASCII 字符原样保留。
pub fn save<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(data).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
