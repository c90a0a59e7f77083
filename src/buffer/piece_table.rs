//! ピーステーブル実装
//!
//! 読み取り専用の元テキストと追記専用の追加バッファを参照する「ピース」の列で
//! 現在の内容を表現する。ピース列はチャンク木で保持するため、
//! 挿入・削除は O(log m)、範囲取得は O(log m + k)（m はピース数）。

use super::tree::{Chunk, ChunkTree};
use super::{check_position, check_range, BufferType, TextBuffer};
use crate::error::buffer::Result;

/// ピースの参照先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Original,
    Added,
}

/// 参照先の連続区間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    source: Source,
    start: usize,
    len: usize,
}

impl Chunk for Piece {
    fn len(&self) -> usize {
        self.len
    }

    fn split_off(&mut self, at: usize) -> Self {
        let tail = Piece {
            source: self.source,
            start: self.start + at,
            len: self.len - at,
        };
        self.len = at;
        tail
    }

    /// 同じ参照先で連続していれば 1 つのピースにまとめる
    fn try_append(&mut self, other: &Self) -> bool {
        if self.source != other.source || self.start + self.len != other.start {
            return false;
        }
        self.len += other.len;
        true
    }
}

/// ピーステーブルバッファ構造体
#[derive(Debug, Clone, Default)]
pub struct PieceTableBuffer {
    /// 初期内容（変更されない）
    original: Vec<char>,
    /// 挿入されたテキスト（追記のみ）
    added: Vec<char>,
    /// 現在の内容を表すピース列
    pieces: ChunkTree<Piece>,
}

impl PieceTableBuffer {
    /// 新しい空のピーステーブルを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列からピーステーブルを作成
    pub fn from_str(s: &str) -> Self {
        let original: Vec<char> = s.chars().collect();
        let piece = Piece {
            source: Source::Original,
            start: 0,
            len: original.len(),
        };
        Self {
            original,
            added: Vec::new(),
            pieces: ChunkTree::from_chunks(vec![piece]),
        }
    }

    fn source(&self, source: Source) -> &[char] {
        match source {
            Source::Original => &self.original,
            Source::Added => &self.added,
        }
    }

    fn collect_range(&self, start: usize, end: usize) -> String {
        let mut out = String::with_capacity(end - start);
        self.pieces.for_each_in_range(start, end, |piece, s, e| {
            let chars = self.source(piece.source);
            out.extend(&chars[piece.start + s..piece.start + e]);
        });
        out
    }

    #[cfg(test)]
    fn piece_count(&self) -> usize {
        self.pieces.leaf_count()
    }
}

impl TextBuffer for PieceTableBuffer {
    fn insert(&mut self, position: usize, text: &str) -> Result<()> {
        check_position(position, self.pieces.len())?;
        let start = self.added.len();
        self.added.extend(text.chars());
        let piece = Piece {
            source: Source::Added,
            start,
            len: self.added.len() - start,
        };
        self.pieces.insert(position, vec![piece]);
        Ok(())
    }

    fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        check_range(start, end, self.pieces.len())?;
        self.pieces.remove(start, end);
        Ok(())
    }

    fn substring(&self, start: usize, end: usize) -> Result<String> {
        check_range(start, end, self.pieces.len())?;
        Ok(self.collect_range(start, end))
    }

    fn len(&self) -> usize {
        self.pieces.len()
    }

    fn clear(&mut self) {
        self.original.clear();
        self.added.clear();
        self.pieces.clear();
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::PieceTable
    }

    fn contents(&self) -> String {
        self.collect_range(0, self.pieces.len())
    }
}
