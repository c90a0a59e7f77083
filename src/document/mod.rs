//! ドキュメント
//!
//! 1 つのテキストバッファと 1 つのカーソルを所有し、カーソル相対の編集操作を提供する。
//! バッファとカーソルは同じロックで保護され、他スレッドから見て常に一貫した組として観測される。

pub mod cursor;

use crate::buffer::{BufferType, TextBuffer};
use crate::error::{EditorError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// 編集操作直後のカーソル位置と文書長
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    pub cursor_position: usize,
    pub length: usize,
}

/// ドキュメントの概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub length: usize,
    pub cursor_position: usize,
    pub buffer_type: BufferType,
}

/// ロックで保護される状態
#[derive(Debug)]
struct DocumentState {
    buffer: Box<dyn TextBuffer>,
    cursor: usize,
}

impl DocumentState {
    fn snapshot(&self) -> CursorState {
        CursorState {
            cursor_position: self.cursor,
            length: self.buffer.len(),
        }
    }

    /// 調整済みカーソルを確定する。範囲外なら丸めて警告する
    fn commit_cursor(&mut self, id: &str, adjusted: usize) {
        let length = self.buffer.len();
        let clamped = cursor::clamp(adjusted, length);
        if clamped != adjusted {
            log::warn!(
                "cursor {} clamped to {} in document {} (length {})",
                adjusted,
                clamped,
                id,
                length
            );
        }
        self.cursor = clamped;
    }
}

/// カーソル付きドキュメント
#[derive(Debug)]
pub struct Document {
    /// ドキュメントID（生成後は不変）
    id: String,
    /// バッファ実装の種別
    buffer_type: BufferType,
    /// バッファとカーソル
    state: Mutex<DocumentState>,
}

impl Document {
    /// バッファを所有するドキュメントを作成。カーソルは末尾に置く
    pub fn new(id: impl Into<String>, buffer: Box<dyn TextBuffer>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(EditorError::invalid_argument("Document ID cannot be empty"));
        }

        let cursor = buffer.len();
        Ok(Self {
            id,
            buffer_type: buffer.buffer_type(),
            state: Mutex::new(DocumentState { buffer, cursor }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, DocumentState>> {
        Ok(self.state.lock()?)
    }

    /// ドキュメントIDを取得
    pub fn id(&self) -> &str {
        &self.id
    }

    /// バッファ実装の種別を取得
    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    /// 現在のカーソル位置を取得
    pub fn cursor_position(&self) -> Result<usize> {
        Ok(self.lock()?.cursor)
    }

    /// 現在のカーソル位置と文書長を取得
    pub fn cursor_state(&self) -> Result<CursorState> {
        Ok(self.lock()?.snapshot())
    }

    /// 文書長（文字数）を取得
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.buffer.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// カーソルを絶対位置に設定。`position > len` は範囲外エラー
    pub fn set_cursor_position(&self, position: usize) -> Result<CursorState> {
        let mut state = self.lock()?;
        crate::buffer::check_position(position, state.buffer.len())?;
        state.cursor = position;
        Ok(state.snapshot())
    }

    /// カーソルを相対移動。範囲外への移動は端で止まる
    pub fn move_cursor(&self, offset: isize) -> Result<CursorState> {
        let mut state = self.lock()?;
        state.cursor = cursor::offset(state.cursor, offset, state.buffer.len());
        Ok(state.snapshot())
    }

    /// テキストを挿入
    ///
    /// `position` が `None` なら現在のカーソル位置に挿入する。
    pub fn insert(
        &self,
        position: Option<usize>,
        text: &str,
        move_cursor: bool,
    ) -> Result<CursorState> {
        let mut state = self.lock()?;
        let position = position.unwrap_or(state.cursor);
        state.buffer.insert(position, text)?;

        let inserted = text.chars().count();
        let adjusted = cursor::after_insert(state.cursor, position, inserted, move_cursor);
        state.commit_cursor(&self.id, adjusted);
        Ok(state.snapshot())
    }

    /// 範囲 `[start, end)` を削除
    pub fn delete(&self, start: usize, end: usize, move_cursor: bool) -> Result<CursorState> {
        let mut state = self.lock()?;
        state.buffer.delete(start, end)?;

        let adjusted = cursor::after_delete(state.cursor, start, end, move_cursor);
        state.commit_cursor(&self.id, adjusted);
        Ok(state.snapshot())
    }

    /// 範囲 `[start, end)` の内容を取得。カーソルは変化しない
    pub fn substring(&self, start: usize, end: usize) -> Result<String> {
        Ok(self.lock()?.buffer.substring(start, end)?)
    }

    /// `start` から末尾までの内容を取得
    pub fn substring_to_end(&self, start: usize) -> Result<String> {
        let state = self.lock()?;
        let end = state.buffer.len();
        Ok(state.buffer.substring(start, end)?)
    }

    /// 全テキストを取得
    pub fn contents(&self) -> Result<String> {
        Ok(self.lock()?.buffer.contents())
    }

    /// 内容を空にする。カーソルは 0 に戻る
    pub fn clear(&self) -> Result<CursorState> {
        let mut state = self.lock()?;
        state.buffer.clear();
        state.cursor = 0;
        Ok(state.snapshot())
    }

    /// ドキュメントの概要を取得
    pub fn info(&self) -> Result<DocumentInfo> {
        let state = self.lock()?;
        Ok(DocumentInfo {
            document_id: self.id.clone(),
            length: state.buffer.len(),
            cursor_position: state.cursor,
            buffer_type: self.buffer_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{PieceTableBuffer, RopeBuffer, SimpleBuffer};
    use crate::error::{BufferError, ErrorKind};

    fn documents(content: &str) -> Vec<Document> {
        vec![
            Document::new("simple", Box::new(SimpleBuffer::from_str(content))).unwrap(),
            Document::new("rope", Box::new(RopeBuffer::from_str(content))).unwrap(),
            Document::new("piece", Box::new(PieceTableBuffer::from_str(content))).unwrap(),
        ]
    }

    #[test]
    fn test_cursor_starts_at_end() {
        for doc in documents("Hello") {
            assert_eq!(doc.cursor_position().unwrap(), 5);
            assert_eq!(doc.len().unwrap(), 5);
        }
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = Document::new("", Box::new(SimpleBuffer::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_insert_into_empty_moves_cursor() {
        for doc in documents("") {
            let state = doc.insert(Some(0), "Hello", true).unwrap();
            assert_eq!(state, CursorState { cursor_position: 5, length: 5 });
            assert_eq!(doc.contents().unwrap(), "Hello");
        }
    }

    #[test]
    fn test_insert_at_cursor_sentinel() {
        for doc in documents("Hello") {
            doc.set_cursor_position(2).unwrap();
            let state = doc.insert(None, "XX", false).unwrap();
            // カーソル位置への挿入はカーソルを押し出す
            assert_eq!(state.cursor_position, 4);
            assert_eq!(doc.contents().unwrap(), "HeXXllo");
        }
    }

    #[test]
    fn test_insert_after_cursor_keeps_cursor() {
        for doc in documents("Hello") {
            doc.set_cursor_position(1).unwrap();
            let state = doc.insert(Some(3), "__", false).unwrap();
            assert_eq!(state.cursor_position, 1);
            let state = doc.insert(Some(3), "", true).unwrap();
            assert_eq!(state.cursor_position, 1);
        }
    }

    #[test]
    fn test_delete_cursor_inside_range() {
        for doc in documents("Hello World") {
            doc.set_cursor_position(10).unwrap();
            let state = doc.delete(6, 11, false).unwrap();
            assert_eq!(doc.contents().unwrap(), "Hello ");
            assert_eq!(state, CursorState { cursor_position: 6, length: 6 });
        }
    }

    #[test]
    fn test_delete_before_cursor_shifts_back() {
        for doc in documents("ABCDEFGHIJ") {
            doc.set_cursor_position(9).unwrap();
            let state = doc.delete(0, 3, false).unwrap();
            assert_eq!(doc.contents().unwrap(), "DEFGHIJ");
            assert_eq!(state.cursor_position, 6);
        }
    }

    #[test]
    fn test_empty_delete_is_noop() {
        for doc in documents("abc") {
            doc.set_cursor_position(1).unwrap();
            let state = doc.delete(2, 2, true).unwrap();
            assert_eq!(state, CursorState { cursor_position: 1, length: 3 });
        }
    }

    #[test]
    fn test_invalid_operations_do_not_mutate() {
        for doc in documents("abc") {
            doc.set_cursor_position(1).unwrap();
            assert!(doc.insert(Some(4), "x", true).is_err());
            assert!(doc.delete(2, 1, true).is_err());
            assert!(doc.delete(0, 4, true).is_err());
            let err = doc.set_cursor_position(4).unwrap_err();
            assert_eq!(
                err,
                EditorError::Buffer(BufferError::OutOfRange { position: 4, length: 3 })
            );
            assert_eq!(doc.contents().unwrap(), "abc");
            assert_eq!(doc.cursor_position().unwrap(), 1);
        }
    }

    #[test]
    fn test_move_cursor_clamps() {
        for doc in documents("abc") {
            assert_eq!(doc.move_cursor(-10).unwrap().cursor_position, 0);
            assert_eq!(doc.move_cursor(2).unwrap().cursor_position, 2);
            assert_eq!(doc.move_cursor(100).unwrap().cursor_position, 3);
        }
    }

    #[test]
    fn test_substring_does_not_touch_cursor() {
        for doc in documents("Hello World") {
            doc.set_cursor_position(3).unwrap();
            assert_eq!(doc.substring(0, 5).unwrap(), "Hello");
            assert_eq!(doc.substring_to_end(6).unwrap(), "World");
            assert_eq!(doc.cursor_position().unwrap(), 3);
        }
    }

    #[test]
    fn test_info_reports_buffer_type() {
        let types: Vec<BufferType> = documents("xy")
            .iter()
            .map(|doc| doc.info().unwrap().buffer_type)
            .collect();
        assert_eq!(
            types,
            vec![BufferType::Simple, BufferType::Rope, BufferType::PieceTable]
        );
        let docs = documents("xy");
        let doc = &docs[0];
        doc.clear().unwrap();
        let info = doc.info().unwrap();
        assert_eq!((info.length, info.cursor_position), (0, 0));
        assert_eq!(info.document_id, "simple");
    }
}
