//! 線形バッファ実装
//!
//! 連続した `char` 配列による参照実装。挿入・削除は O(n)、範囲取得は O(k)。

use super::{check_position, check_range, BufferType, TextBuffer};
use crate::error::buffer::Result;

/// 線形バッファ構造体
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleBuffer {
    /// 内容（文字単位）
    chars: Vec<char>,
}

impl SimpleBuffer {
    /// 新しい空のバッファを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字列からバッファを作成
    pub fn from_str(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
        }
    }
}

impl TextBuffer for SimpleBuffer {
    fn insert(&mut self, position: usize, text: &str) -> Result<()> {
        check_position(position, self.chars.len())?;
        if text.is_empty() {
            return Ok(());
        }
        self.chars.splice(position..position, text.chars());
        Ok(())
    }

    fn delete(&mut self, start: usize, end: usize) -> Result<()> {
        check_range(start, end, self.chars.len())?;
        self.chars.drain(start..end);
        Ok(())
    }

    fn substring(&self, start: usize, end: usize) -> Result<String> {
        check_range(start, end, self.chars.len())?;
        Ok(self.chars[start..end].iter().collect())
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn clear(&mut self) {
        self.chars.clear();
    }

    fn buffer_type(&self) -> BufferType {
        BufferType::Simple
    }

    fn contents(&self) -> String {
        self.chars.iter().collect()
    }
}
