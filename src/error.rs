//! エラーハンドリング
//!
//! texted 全体で使用されるエラー型と、境界層向けのステータス変換を定義

use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// バッファ操作エラー
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// 必須値の欠落・不正な引数
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 未知のドキュメントID
    #[error("Document not found: {id}")]
    NotFound { id: String },

    /// ドキュメントIDの衝突
    #[error("Document with ID '{id}' already exists")]
    AlreadyExists { id: String },

    /// 想定外の内部エラー
    #[error("Internal error: {0}")]
    Internal(String),

    /// 設定エラー
    #[error("Configuration error")]
    Config(#[from] ConfigError),
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Position {position} is out of bounds (length: {length})")]
    OutOfRange { position: usize, length: usize },

    #[error("Range [{start}, {end}) is invalid (length: {length})")]
    InvalidRange { start: usize, end: usize, length: usize },

    #[error("Text cannot be absent")]
    MissingText,
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed configuration: {message}")]
    Parse { message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// エラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfRange,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Internal,
}

/// 境界層（RPC 等）へ返すステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    NotFound,
    InvalidArgument,
    AlreadyExists,
    Internal,
}

impl EditorError {
    /// エラー分類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Buffer(BufferError::MissingText) => ErrorKind::InvalidArgument,
            EditorError::Buffer(_) => ErrorKind::OutOfRange,
            EditorError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            EditorError::NotFound { .. } => ErrorKind::NotFound,
            EditorError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            EditorError::Internal(_) => ErrorKind::Internal,
            EditorError::Config(_) => ErrorKind::InvalidArgument,
        }
    }

    /// 境界層のステータスへ変換
    ///
    /// 範囲外アクセスは呼び出し側の引数誤りとして `InvalidArgument` に寄せる
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::OutOfRange | ErrorKind::InvalidArgument => StatusCode::InvalidArgument,
            ErrorKind::NotFound => StatusCode::NotFound,
            ErrorKind::AlreadyExists => StatusCode::AlreadyExists,
            ErrorKind::Internal => StatusCode::Internal,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        EditorError::InvalidArgument(message.into())
    }
}

/// ロック汚染は内部エラーとして扱う
impl<T> From<std::sync::PoisonError<T>> for EditorError {
    fn from(error: std::sync::PoisonError<T>) -> Self {
        EditorError::Internal(format!("document lock poisoned: {}", error))
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, EditorError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod config {
    pub type Result<T> = std::result::Result<T, super::ConfigError>;
}
