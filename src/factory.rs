//! ドキュメント生成
//!
//! バッファ実装の選択とドキュメントの組み立てを担う。状態を持たないため複数スレッドから共有できる。

use crate::buffer::BufferType;
use crate::document::Document;
use crate::error::{EditorError, Result};
use serde::{Deserialize, Serialize};

/// バッファ実装の選択方針
///
/// 既定ではすべて線形バッファ。`large_document_threshold` を設定すると、
/// 初期内容がその文字数以上のときに `large_document_type` を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPolicy {
    pub default_type: BufferType,
    pub large_document_type: BufferType,
    pub large_document_threshold: Option<usize>,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            default_type: BufferType::Simple,
            large_document_type: BufferType::Rope,
            large_document_threshold: None,
        }
    }
}

impl BufferPolicy {
    /// 常に指定の実装を使う方針
    pub fn fixed(buffer_type: BufferType) -> Self {
        Self {
            default_type: buffer_type,
            large_document_type: buffer_type,
            large_document_threshold: None,
        }
    }

    /// 初期内容の文字数から実装を選ぶ
    pub fn select(&self, content_len: usize) -> BufferType {
        match self.large_document_threshold {
            Some(threshold) if content_len >= threshold => self.large_document_type,
            _ => self.default_type,
        }
    }
}

/// ドキュメントファクトリ
#[derive(Debug, Clone, Default)]
pub struct DocumentFactory {
    policy: BufferPolicy,
}

impl DocumentFactory {
    /// 既定の方針（線形バッファ固定）でファクトリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 方針を指定してファクトリを作成
    pub fn with_policy(policy: BufferPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BufferPolicy {
        &self.policy
    }

    /// ドキュメントを作成。`initial_content` が `None` なら空文書
    pub fn create(&self, id: &str, initial_content: Option<&str>) -> Result<Document> {
        self.create_with_type(id, initial_content, None)
    }

    /// バッファ種別を明示してドキュメントを作成。`None` なら方針に従う
    pub fn create_with_type(
        &self,
        id: &str,
        initial_content: Option<&str>,
        buffer_type: Option<BufferType>,
    ) -> Result<Document> {
        if id.is_empty() {
            return Err(EditorError::invalid_argument(
                "Document ID cannot be null or empty",
            ));
        }

        let content = initial_content.unwrap_or("");
        let buffer_type = buffer_type.unwrap_or_else(|| self.select_buffer(content));
        Document::new(id, buffer_type.create(content))
    }

    fn select_buffer(&self, content: &str) -> BufferType {
        self.policy.select(content.chars().count())
    }
}
