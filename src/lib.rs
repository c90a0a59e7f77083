//! texted - 編集セッション向けのアドレス指定可能なテキスト文書
//!
//! バッファ抽象・カーソル追跡付きドキュメント・ドキュメントレジストリの 3 層構成

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;

// 編集層
pub mod document;
pub mod factory;

// 管理層
pub mod manager;
pub mod service;

// 公開API
pub use buffer::{BufferType, PieceTableBuffer, RopeBuffer, SimpleBuffer, TextBuffer};
pub use config::EditorConfig;
pub use document::{CursorState, Document, DocumentInfo};
pub use error::{EditorError, ErrorKind, Result, StatusCode};
pub use factory::{BufferPolicy, DocumentFactory};
pub use manager::DocumentManager;
pub use service::TextEditorService;
