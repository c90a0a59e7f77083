//! ロープ実装
//!
//! 文字列断片を葉に持つ高さ平衡木。挿入・削除は O(log n)、範囲取得は O(log n + k)。
//! 各断片は最大 `MAX_CHUNK_CHARS` 文字なので、断片内の文字位置→バイト位置変換は定数時間。

use super::tree::{Chunk, ChunkTree};
use super::{check_position, check_range, BufferType, TextBuffer};
use crate::error::buffer::Result;

const MAX_CHUNK_CHARS: usize = 256;

/// ロープの葉（UTF-8 文字列断片と文字数）
#[derive(Debug, Clone)]
struct TextChunk {
    text: String,
    chars: usize,
}

impl TextChunk {
    /// 断片内の文字位置をバイト位置に変換
    fn byte_offset(&self, char_pos: usize) -> usize {
        if char_pos >= self.chars {
            return self.text.len();
        }
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }
}

impl Chunk for TextChunk {
    fn len(&self) -> usize {
        self.chars
    }

    fn split_off(&mut self, at: usize) -> Self {
        let byte = self.byte_offset(at);
        let tail = self.text.split_off(byte);
        let tail_chars = self.chars - at;
        self.chars = at;
        TextChunk {
            text: tail,
            chars: tail_chars,
        }
    }

    fn try_append(&mut self, other: &Self) -> bool {
        if self.chars + other.chars > MAX_CHUNK_CHARS {
            return false;
        }
        self.text.push_str(&other.text);
        self.chars += other.chars;
        true
    }
}

/// テキストを最大長ごとの断片に切り分ける
fn chunks_of(text: &str) -> Vec<TextChunk> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (idx, _) in text.char_indices() {
        if chars == MAX_CHUNK_CHARS {
            chunks.push(TextChunk {
                text: text[start..idx].to_string(),
                chars,
            });
            start = idx;
            chars = 0;
        }
        chars += 1;
    }
    if chars > 0 {
        chunks.push(TextChunk {
            text: text[start..].to_string(),
            chars,
        });
    }

    chunks
}

/// ロープバッファ構造体
#[derive(Debug, Clone, Default)]
pub struct RopeBuffer {
    tree: ChunkTree<TextChunk>,
}

impl RopeBuffer {
    /// 新しい空のロープを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列からロープを作成
    pub fn from_str(s: &str) -> Self {
        Self {
            tree: ChunkTree::from_chunks(chunks_of(s)),
        }
    }
}

impl TextBuffer for RopeBuffer {
    fn insert(&mut self, position: usize, text: &str) -> Result<()> {
        check_position(position, self.tree.len())?;
        self.tree.insert(position, chunks_of(text));
        Ok(())
    }

    fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        check_range(start, end, self.tree.len())?;
        self.tree.remove(start, end);
        Ok(())
    }

    fn substring(&self, start: usize, end: usize) -> Result<String> {
        check_range(start, end, self.tree.len())?;
        let mut out = String::with_capacity(end - start);
        self.tree
            .for_each_in_range(start, end, |chunk, s, e| out.push_str(chunk.slice(s, e)));
        Ok(out)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Rope
    }

    fn contents(&self) -> String {
        let mut out = String::new();
        self.tree
            .for_each_in_range(0, self.tree.len(), |chunk, s, e| out.push_str(chunk.slice(s, e)));
        out
    }
}
