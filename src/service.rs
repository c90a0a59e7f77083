//! リクエスト処理層
//!
//! 通信手段に依存しない要求・応答の形で外部インターフェースを提供する。
//! ワイヤ上の位置は符号付き整数で、`-1` は文書に応じた既定値（挿入位置ならカーソル、
//! 範囲終端なら文書末尾）を意味する。エラーはステータスコード付きで返す。

use crate::buffer::BufferType;
use crate::document::{CursorState, Document};
use crate::error::{EditorError, StatusCode};
use crate::manager::DocumentManager;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// ワイヤ上の「既定値を使う」位置
pub const SENTINEL_POSITION: i64 = -1;

/// 境界層へ返すエラー
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct ServiceError {
    pub code: StatusCode,
    pub message: String,
}

impl ServiceError {
    fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::InvalidArgument,
            message: message.into(),
        }
    }
}

impl From<EditorError> for ServiceError {
    fn from(error: EditorError) -> Self {
        Self {
            code: error.status(),
            message: error.to_string(),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDocumentRequest {
    /// 空なら自動採番
    pub document_id: String,
    pub initial_content: Option<String>,
    /// 空なら設定に従う
    pub buffer_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
    pub document_id: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseDocumentRequest {
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseDocumentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertRequest {
    pub document_id: String,
    /// `-1` はカーソル位置
    pub position: i64,
    pub text: Option<String>,
    pub move_cursor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteRequest {
    pub document_id: String,
    pub start_position: i64,
    pub end_position: i64,
    pub move_cursor: bool,
}

/// 挿入・削除の応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    pub cursor_position: usize,
    pub document_length: usize,
}

/// カーソル移動の指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMovement {
    AbsolutePosition(i64),
    RelativeOffset(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCursorRequest {
    pub document_id: String,
    pub movement: CursorMovement,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetCursorPositionRequest {
    pub document_id: String,
}

/// カーソル関連の応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorResponse {
    pub cursor_position: usize,
    pub document_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetSubstringRequest {
    pub document_id: String,
    pub start_position: i64,
    /// `-1` は文書末尾
    pub end_position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSubstringResponse {
    pub text: String,
    pub actual_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetDocumentInfoRequest {
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetDocumentInfoResponse {
    pub document_id: String,
    pub length: usize,
    pub cursor_position: usize,
    pub buffer_type: String,
}

impl From<CursorState> for OperationResponse {
    fn from(state: CursorState) -> Self {
        Self {
            cursor_position: state.cursor_position,
            document_length: state.length,
        }
    }
}

impl From<CursorState> for CursorResponse {
    fn from(state: CursorState) -> Self {
        Self {
            cursor_position: state.cursor_position,
            document_length: state.length,
        }
    }
}

/// 非負の位置に変換
fn to_position(value: i64, name: &str) -> ServiceResult<usize> {
    usize::try_from(value)
        .map_err(|_| ServiceError::invalid_argument(format!("{} {} cannot be negative", name, value)))
}

/// 相対移動量に変換。表現できない量は端への移動とみなす
fn to_offset(value: i64) -> isize {
    isize::try_from(value).unwrap_or(if value < 0 { isize::MIN } else { isize::MAX })
}

/// テキスト編集サービス
#[derive(Debug, Clone, Default)]
pub struct TextEditorService {
    manager: Arc<DocumentManager>,
}

impl TextEditorService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のマネージャーを共有して作成
    pub fn with_manager(manager: Arc<DocumentManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<DocumentManager> {
        &self.manager
    }

    fn document(&self, document_id: &str) -> ServiceResult<Arc<Document>> {
        if document_id.is_empty() {
            return Err(ServiceError::invalid_argument("Document ID cannot be empty"));
        }
        Ok(self.manager.get_document(document_id)?)
    }

    fn respond<T>(operation: &str, result: ServiceResult<T>) -> ServiceResult<T> {
        if let Err(error) = &result {
            debug!("{} failed with {:?}: {}", operation, error.code, error.message);
        }
        result
    }

    pub fn create_document(
        &self,
        request: CreateDocumentRequest,
    ) -> ServiceResult<CreateDocumentResponse> {
        let result = (|| -> ServiceResult<CreateDocumentResponse> {
            let buffer_type = match request.buffer_type.as_str() {
                "" => None,
                name => Some(name.parse::<BufferType>()?),
            };
            let document = self.manager.create_document(
                Some(request.document_id.as_str()),
                request.initial_content.as_deref(),
                buffer_type,
            )?;
            Ok(CreateDocumentResponse {
                document_id: document.id().to_string(),
                success: true,
                message: format!("Document '{}' created", document.id()),
            })
        })();
        Self::respond("createDocument", result)
    }

    pub fn close_document(
        &self,
        request: CloseDocumentRequest,
    ) -> ServiceResult<CloseDocumentResponse> {
        let result = (|| -> ServiceResult<CloseDocumentResponse> {
            if request.document_id.is_empty() {
                return Err(ServiceError::invalid_argument("Document ID cannot be empty"));
            }
            self.manager.close_document(&request.document_id)?;
            Ok(CloseDocumentResponse {
                success: true,
                message: format!("Document '{}' closed", request.document_id),
            })
        })();
        Self::respond("closeDocument", result)
    }

    pub fn insert(&self, request: InsertRequest) -> ServiceResult<OperationResponse> {
        let result = (|| -> ServiceResult<OperationResponse> {
            let document = self.document(&request.document_id)?;
            let text = request
                .text
                .as_deref()
                .ok_or_else(|| ServiceError::invalid_argument("Text cannot be null"))?;
            let position = match request.position {
                SENTINEL_POSITION => None,
                value => Some(to_position(value, "Insert position")?),
            };
            Ok(document.insert(position, text, request.move_cursor)?.into())
        })();
        Self::respond("insert", result)
    }

    pub fn delete(&self, request: DeleteRequest) -> ServiceResult<OperationResponse> {
        let result = (|| -> ServiceResult<OperationResponse> {
            let document = self.document(&request.document_id)?;
            let start = to_position(request.start_position, "Start position")?;
            let end = to_position(request.end_position, "End position")?;
            Ok(document.delete(start, end, request.move_cursor)?.into())
        })();
        Self::respond("delete", result)
    }

    pub fn move_cursor(&self, request: MoveCursorRequest) -> ServiceResult<CursorResponse> {
        let result = (|| -> ServiceResult<CursorResponse> {
            let document = self.document(&request.document_id)?;
            let state = match request.movement {
                CursorMovement::AbsolutePosition(position) => {
                    document.set_cursor_position(to_position(position, "Cursor position")?)?
                }
                CursorMovement::RelativeOffset(offset) => document.move_cursor(to_offset(offset))?,
            };
            Ok(state.into())
        })();
        Self::respond("moveCursor", result)
    }

    pub fn get_cursor_position(
        &self,
        request: GetCursorPositionRequest,
    ) -> ServiceResult<CursorResponse> {
        let result = (|| -> ServiceResult<CursorResponse> {
            let document = self.document(&request.document_id)?;
            Ok(document.cursor_state()?.into())
        })();
        Self::respond("getCursorPosition", result)
    }

    pub fn get_substring(
        &self,
        request: GetSubstringRequest,
    ) -> ServiceResult<GetSubstringResponse> {
        let result = (|| -> ServiceResult<GetSubstringResponse> {
            let document = self.document(&request.document_id)?;
            let start = to_position(request.start_position, "Start position")?;
            let text = match request.end_position {
                SENTINEL_POSITION => document.substring_to_end(start)?,
                end => document.substring(start, to_position(end, "End position")?)?,
            };
            let actual_length = text.chars().count();
            Ok(GetSubstringResponse {
                text,
                actual_length,
            })
        })();
        Self::respond("getSubstring", result)
    }

    pub fn get_document_info(
        &self,
        request: GetDocumentInfoRequest,
    ) -> ServiceResult<GetDocumentInfoResponse> {
        let result = (|| -> ServiceResult<GetDocumentInfoResponse> {
            let info = self.document(&request.document_id)?.info()?;
            Ok(GetDocumentInfoResponse {
                document_id: info.document_id,
                length: info.length,
                cursor_position: info.cursor_position,
                buffer_type: info.buffer_type.to_string(),
            })
        })();
        Self::respond("getDocumentInfo", result)
    }
}
