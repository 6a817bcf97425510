//! `config.yml` 读写：缺失时写出带注释的默认配置，缺字段时补齐后回写。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::context::Config;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{path} must be a yaml mapping")]
    NotAMapping { path: PathBuf },
    #[error("cannot render config: {0}")]
    Render(#[source] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub fn config_path(base_dir: Option<&Path>) -> PathBuf {
    match base_dir {
        Some(base) => base.join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

/// 读取 `base_dir/config.yml`（未指定时为当前目录），返回的 `Config` 已绑定 `base_dir`。
pub fn load_or_create(base_dir: Option<&Path>) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);

    if !path.exists() {
        let config = Config::default();
        write_commented(&config, &path)?;
        return Ok(config.with_base_dir(base_dir));
    }

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    let fields = match parsed {
        Value::Mapping(map) => map,
        // 空文件
        Value::Null => Mapping::new(),
        _ => return Err(ConfigError::NotAMapping { path }),
    };

    let complete = Config::FIELDS
        .iter()
        .all(|field| fields.contains_key(field.name));
    let config: Config =
        serde_yaml::from_value(Value::Mapping(fields)).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

    if !complete {
        write_commented(&config, &path)?;
    }
    Ok(config.with_base_dir(base_dir))
}

fn write_commented(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, render_commented(config)?).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 按 `Config::FIELDS` 的顺序输出，每个字段前附一行说明。
fn render_commented(config: &Config) -> Result<String, ConfigError> {
    let values = serde_yaml::to_value(config).map_err(ConfigError::Render)?;

    let mut out = String::new();
    for field in Config::FIELDS {
        out.push_str("# ");
        out.push_str(field.description);
        out.push('\n');
        let value = values.get(field.name).cloned().unwrap_or(Value::Null);
        let entry = Mapping::from_iter([(Value::String(field.name.to_string()), value)]);
        out.push_str(&serde_yaml::to_string(&entry).map_err(ConfigError::Render)?);
    }
    Ok(out)
}
