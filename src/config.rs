//! 設定
//!
//! JSON で記述された設定を読み込む。未指定の項目は既定値で補う。

use crate::error::{config::Result, ConfigError};
use crate::factory::BufferPolicy;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// ロギング設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `off` / `error` / `warn` / `info` / `debug` / `trace`
    pub level: String,
    /// 標準エラー出力へ書き出すか
    pub stderr: bool,
    /// 追記先ファイル（任意）
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stderr: true,
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.level).map_err(|_| ConfigError::InvalidValue {
            key: "logging.level".to_string(),
            value: self.level.clone(),
        })
    }
}

/// 全体設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub buffer: BufferPolicy,
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// JSON 文字列から読み込む
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// JSON ファイルから読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// 値の整合性を検査
    pub fn validate(&self) -> Result<()> {
        self.logging.level_filter()?;
        if self.buffer.large_document_threshold == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "buffer.large_document_threshold".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
