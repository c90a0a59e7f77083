//! ロギングシステム
//!
//! `log` ファサードの出力先。標準エラー出力と任意の追記ファイルへ 1 行ずつ書き出す。

use crate::config::LoggingConfig;
use crate::error::config::Result;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// ロガー
#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LevelFilter::Debug)
    }

    /// 設定から構築
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        let mut logger = Self::new(config.level_filter()?);
        logger.output_stderr = config.stderr;
        logger.output_file = config.file.clone();
        Ok(logger)
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// ログレベルを変更
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn format(record: &Record<'_>) -> String {
        format!("{} [{}] {}", record.level(), record.target(), record.args())
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", message);
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.write_line(&Self::format(record));
        }
    }

    fn flush(&self) {}
}

/// 設定に従ってグローバルロガーを登録する
///
/// 既に登録済みなら何もせず `false` を返す。
pub fn init(config: &LoggingConfig) -> Result<bool> {
    let logger = Logger::from_config(config)?;
    let level = logger.level();
    match log::set_logger(Box::leak(Box::new(logger))) {
        Ok(()) => {
            log::set_max_level(level);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn metadata(level: Level) -> Metadata<'static> {
        Metadata::builder().level(level).target("texted").build()
    }

    #[test]
    fn logger_respects_log_level() {
        let logger = Logger::for_development().without_stderr();
        assert!(logger.enabled(&metadata(Level::Debug)));
        assert!(!logger.enabled(&metadata(Level::Trace)));

        let info_logger = Logger::for_development()
            .with_level(LevelFilter::Info)
            .without_stderr();
        assert!(!info_logger.enabled(&metadata(Level::Debug)));
        assert!(info_logger.enabled(&metadata(Level::Warn)));
    }

    #[test]
    fn logger_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texted.log");
        let logger = Logger::new(LevelFilter::Info)
            .without_stderr()
            .with_file_output(&path);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("texted::manager")
                .args(format_args!("created document {}", "doc-1"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("texted::manager")
                .args(format_args!("filtered"))
                .build(),
        );

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "INFO [texted::manager] created document doc-1\n");
    }

    #[test]
    fn from_config_rejects_unknown_level() {
        let config = LoggingConfig {
            level: "chatty".to_string(),
            ..LoggingConfig::default()
        };
        assert!(Logger::from_config(&config).is_err());
    }
}
