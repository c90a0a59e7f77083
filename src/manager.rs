//! ドキュメント管理
//!
//! ドキュメントIDからドキュメントへの並行レジストリ。ID の生成と、
//! 作成・取得・クローズのライフサイクルを担う。
//!
//! 登録はシャード単位でロックされる `DashMap` の entry API で行うため、
//! 同一 ID の存在確認と挿入が 1 つの原子的な操作になる。

use crate::buffer::BufferType;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::factory::DocumentFactory;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const GENERATED_ID_PREFIX: &str = "doc-";

/// ドキュメントマネージャー
#[derive(Debug)]
pub struct DocumentManager {
    /// 生存中のドキュメント
    documents: DashMap<String, Arc<Document>>,
    /// 自動採番用カウンタ（1 始まり、再利用しない）
    next_id: AtomicU64,
    /// ドキュメント生成方針
    factory: DocumentFactory,
}

impl DocumentManager {
    /// 新しいドキュメントマネージャーを作成
    pub fn new() -> Self {
        Self::with_factory(DocumentFactory::new())
    }

    /// ファクトリを指定して作成
    pub fn with_factory(factory: DocumentFactory) -> Self {
        Self {
            documents: DashMap::new(),
            next_id: AtomicU64::new(1),
            factory,
        }
    }

    pub fn factory(&self) -> &DocumentFactory {
        &self.factory
    }

    /// ドキュメントを作成して登録する
    ///
    /// `id` が `None` または空文字列なら `doc-N` を採番する。
    /// 既に同じ ID のドキュメントが存在する場合は `AlreadyExists`。
    pub fn create_document(
        &self,
        id: Option<&str>,
        initial_content: Option<&str>,
        buffer_type: Option<BufferType>,
    ) -> Result<Arc<Document>> {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.generate_id(),
        };

        let document = Arc::new(
            self.factory
                .create_with_type(&id, initial_content, buffer_type)?,
        );

        match self.documents.entry(id) {
            Entry::Occupied(entry) => {
                warn!("rejected duplicate document id {}", entry.key());
                Err(EditorError::AlreadyExists {
                    id: entry.key().clone(),
                })
            }
            Entry::Vacant(entry) => {
                info!(
                    "created document {} ({} buffer)",
                    entry.key(),
                    document.buffer_type()
                );
                entry.insert(Arc::clone(&document));
                Ok(document)
            }
        }
    }

    /// ドキュメントを取得。呼び出し側は同じ実体を共有する
    pub fn get_document(&self, id: &str) -> Result<Arc<Document>> {
        self.documents
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EditorError::NotFound { id: id.to_string() })
    }

    /// ドキュメントを閉じてレジストリから取り除く。ID は再利用可能になる
    pub fn close_document(&self, id: &str) -> Result<()> {
        match self.documents.remove(id) {
            Some((id, _)) => {
                info!("closed document {}", id);
                Ok(())
            }
            None => {
                debug!("close requested for unknown document {}", id);
                Err(EditorError::NotFound { id: id.to_string() })
            }
        }
    }

    /// ドキュメントが存在するかを確認
    pub fn has_document(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// 現時点のドキュメントID一覧（昇順）
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .documents
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// 管理中のドキュメント数
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", GENERATED_ID_PREFIX, n)
    }
}

impl Default for DocumentManager {
    fn default() -> Self {
        Self::new()
    }
}
