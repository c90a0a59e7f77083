//! カーソル位置管理
//!
//! 編集操作に伴うカーソル位置の調整規則。バッファには触れない純粋関数として定義し、
//! `Document` がロック内で適用する。

/// 範囲 `[0, length]` に収める
pub fn clamp(cursor: usize, length: usize) -> usize {
    cursor.min(length)
}

/// 相対移動。両端を越える移動は端で止まる
pub fn offset(cursor: usize, delta: isize, length: usize) -> usize {
    let moved = if delta < 0 {
        cursor.saturating_sub(delta.unsigned_abs())
    } else {
        cursor.saturating_add(delta as usize)
    };
    clamp(moved, length)
}

/// `position` に `inserted` 文字を挿入した後のカーソル位置
///
/// * `move_cursor` なら挿入したテキストの直後へ
/// * そうでなければ、挿入位置以降にあったカーソルだけが後ろへずれる
/// * 空の挿入ではカーソルは動かない
pub fn after_insert(cursor: usize, position: usize, inserted: usize, move_cursor: bool) -> usize {
    if inserted == 0 {
        return cursor;
    }
    if move_cursor {
        position + inserted
    } else if cursor >= position {
        cursor + inserted
    } else {
        cursor
    }
}

/// `[start, end)` を削除した後のカーソル位置
///
/// * `move_cursor` なら削除開始位置へ
/// * 削除範囲より後ろのカーソルは削除幅だけ前へ
/// * 削除範囲の内側にあったカーソルは開始位置へ
/// * 開始位置以前のカーソルはそのまま
pub fn after_delete(cursor: usize, start: usize, end: usize, move_cursor: bool) -> usize {
    if start == end {
        return cursor;
    }
    if move_cursor {
        start
    } else if cursor >= end {
        cursor - (end - start)
    } else if cursor > start {
        start
    } else {
        cursor
    }
}
