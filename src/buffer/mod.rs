//! バッファ管理モジュール
//!
//! 位置指定の挿入・削除・範囲取得を提供する文字列バッファの共通契約と、
//! その実装（線形バッファ・ロープ・ピーステーブル）を提供する。
//!
//! 位置はすべて Unicode スカラー値（`char`）単位、0 始まり、範囲は半開区間 `[start, end)`。

pub mod piece_table;
pub mod rope;
pub mod simple;
mod tree;

pub use piece_table::PieceTableBuffer;
pub use rope::RopeBuffer;
pub use simple::SimpleBuffer;

use crate::error::{buffer::Result, BufferError, EditorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// テキストバッファの共通契約
///
/// すべての実装は同じ検証規則に従い、不正な入力では一切変更を行わずにエラーを返す。
pub trait TextBuffer: Send + fmt::Debug {
    /// `position` の直前に `text` を挿入する（`position == len()` は末尾追加）
    fn insert(&mut self, position: usize, text: &str) -> Result<()>;

    /// 半開区間 `[start, end)` を削除する
    fn delete(&mut self, start: usize, end: usize) -> Result<()>;

    /// 半開区間 `[start, end)` の内容を返す
    fn substring(&self, start: usize, end: usize) -> Result<String>;

    /// 現在の文字数（O(1)）
    fn len(&self) -> usize;

    /// 内容を空にする。`delete(0, len())` と等価
    fn clear(&mut self);

    /// 実装の種別
    fn buffer_type(&self) -> BufferType;

    /// 全テキストを文字列として取得
    fn contents(&self) -> String;

    /// 空かどうかを判定
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// バッファ実装の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferType {
    /// O(n) 編集の参照実装
    #[default]
    Simple,
    /// 平衡木によるロープ
    Rope,
    /// ピーステーブル
    #[serde(alias = "piece_table", alias = "piece-table")]
    PieceTable,
}

impl BufferType {
    /// 診断・情報取得用の安定した識別子
    pub fn as_str(self) -> &'static str {
        match self {
            BufferType::Simple => "simple",
            BufferType::Rope => "rope",
            BufferType::PieceTable => "piecetable",
        }
    }

    /// 指定種別のバッファを初期内容付きで構築
    pub fn create(self, content: &str) -> Box<dyn TextBuffer> {
        match self {
            BufferType::Simple => Box::new(SimpleBuffer::from_str(content)),
            BufferType::Rope => Box::new(RopeBuffer::from_str(content)),
            BufferType::PieceTable => Box::new(PieceTableBuffer::from_str(content)),
        }
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferType {
    type Err = EditorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(BufferType::Simple),
            "rope" => Ok(BufferType::Rope),
            "piecetable" | "piece_table" | "piece-table" => Ok(BufferType::PieceTable),
            other => Err(EditorError::invalid_argument(format!(
                "unknown buffer type: {}",
                other
            ))),
        }
    }
}

/// 挿入位置の検証（`0 <= position <= length`）
pub(crate) fn check_position(position: usize, length: usize) -> Result<()> {
    if position > length {
        return Err(BufferError::OutOfRange { position, length });
    }
    Ok(())
}

/// 範囲の検証（`0 <= start <= end <= length`）
pub(crate) fn check_range(start: usize, end: usize, length: usize) -> Result<()> {
    if start > end || end > length {
        return Err(BufferError::InvalidRange { start, end, length });
    }
    Ok(())
}
