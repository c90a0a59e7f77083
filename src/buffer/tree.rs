//! 高さ平衡チャンク木
//!
//! 葉にチャンク（文字列断片やピース）を持ち、内部ノードが部分木の長さと高さを
//! キャッシュする AVL 木。結合（join）と分割（split）だけで挿入・削除を構成するため、
//! どの操作も全体を展開せずに O(log n) で完了する。
//!
//! 不変条件:
//! * 葉は空でない
//! * 内部ノードの `len` は左右の長さの和、`height` は左右の高さの最大値 + 1
//! * 左右の高さの差は 1 以下

use std::fmt;

/// 木の葉に格納できる断片
pub(crate) trait Chunk: Clone + fmt::Debug {
    /// 断片の要素数
    fn len(&self) -> usize;

    /// `at` 以降を切り離して返す（`0 < at < len()`）
    fn split_off(&mut self, at: usize) -> Self;

    /// `other` を末尾に取り込めれば取り込んで `true` を返す
    fn try_append(&mut self, other: &Self) -> bool;
}

#[derive(Debug, Clone)]
enum Node<C> {
    Leaf(C),
    Branch {
        left: Box<Node<C>>,
        right: Box<Node<C>>,
        len: usize,
        height: u8,
    },
}

type Link<C> = Option<Box<Node<C>>>;

impl<C: Chunk> Node<C> {
    fn leaf(chunk: C) -> Box<Self> {
        Box::new(Node::Leaf(chunk))
    }

    fn branch(left: Box<Self>, right: Box<Self>) -> Box<Self> {
        let len = left.len() + right.len();
        let height = left.height().max(right.height()) + 1;
        Box::new(Node::Branch {
            left,
            right,
            len,
            height,
        })
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf(chunk) => chunk.len(),
            Node::Branch { len, .. } => *len,
        }
    }

    fn height(&self) -> u8 {
        match self {
            Node::Leaf(_) => 0,
            Node::Branch { height, .. } => *height,
        }
    }
}

/// `node(a, node(b, c))` -> `node(node(a, b), c)`
fn rotate_left<C: Chunk>(node: Box<Node<C>>) -> Box<Node<C>> {
    match *node {
        Node::Branch { left: a, right, .. } => match *right {
            Node::Branch {
                left: b, right: c, ..
            } => Node::branch(Node::branch(a, b), c),
            leaf => Node::branch(a, Box::new(leaf)),
        },
        leaf => Box::new(leaf),
    }
}

/// `node(node(a, b), c)` -> `node(a, node(b, c))`
fn rotate_right<C: Chunk>(node: Box<Node<C>>) -> Box<Node<C>> {
    match *node {
        Node::Branch { left, right: c, .. } => match *left {
            Node::Branch {
                left: a, right: b, ..
            } => Node::branch(a, Node::branch(b, c)),
            leaf => Node::branch(Box::new(leaf), c),
        },
        leaf => Box::new(leaf),
    }
}

/// 左の木が右より 2 以上高いときの結合。左の右端を下りながら接合点を探す
fn join_right<C: Chunk>(left: Box<Node<C>>, right: Box<Node<C>>) -> Box<Node<C>> {
    let (outer, inner) = match *left {
        Node::Branch { left, right, .. } => (left, right),
        leaf => return Node::branch(Box::new(leaf), right),
    };

    if inner.height() <= right.height() + 1 {
        let joined = Node::branch(inner, right);
        if joined.height() <= outer.height() + 1 {
            Node::branch(outer, joined)
        } else {
            rotate_left(Node::branch(outer, rotate_right(joined)))
        }
    } else {
        let joined = join_right(inner, right);
        let balanced = joined.height() <= outer.height() + 1;
        let node = Node::branch(outer, joined);
        if balanced {
            node
        } else {
            rotate_left(node)
        }
    }
}

/// `join_right` の鏡像
fn join_left<C: Chunk>(left: Box<Node<C>>, right: Box<Node<C>>) -> Box<Node<C>> {
    let (inner, outer) = match *right {
        Node::Branch { left, right, .. } => (left, right),
        leaf => return Node::branch(left, Box::new(leaf)),
    };

    if inner.height() <= left.height() + 1 {
        let joined = Node::branch(left, inner);
        if joined.height() <= outer.height() + 1 {
            Node::branch(joined, outer)
        } else {
            rotate_right(Node::branch(rotate_left(joined), outer))
        }
    } else {
        let joined = join_left(left, inner);
        let balanced = joined.height() <= outer.height() + 1;
        let node = Node::branch(joined, outer);
        if balanced {
            node
        } else {
            rotate_right(node)
        }
    }
}

/// 2 つの平衡木を連結する。コストは高さの差に比例
fn join<C: Chunk>(mut left: Box<Node<C>>, right: Box<Node<C>>) -> Box<Node<C>> {
    let merged = match (left.as_mut(), right.as_ref()) {
        (Node::Leaf(head), Node::Leaf(tail)) => head.try_append(tail),
        _ => false,
    };
    if merged {
        return left;
    }

    let (lh, rh) = (left.height(), right.height());
    if lh > rh + 1 {
        join_right(left, right)
    } else if rh > lh + 1 {
        join_left(left, right)
    } else {
        Node::branch(left, right)
    }
}

fn concat<C: Chunk>(left: Link<C>, right: Link<C>) -> Link<C> {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(left), Some(right)) => Some(join(left, right)),
    }
}

/// `at` の位置で木を 2 つに分割する
fn split<C: Chunk>(node: Box<Node<C>>, at: usize) -> (Link<C>, Link<C>) {
    if at == 0 {
        return (None, Some(node));
    }
    if at >= node.len() {
        return (Some(node), None);
    }

    match *node {
        Node::Leaf(mut chunk) => {
            let tail = chunk.split_off(at);
            (Some(Node::leaf(chunk)), Some(Node::leaf(tail)))
        }
        Node::Branch { left, right, .. } => {
            let left_len = left.len();
            if at < left_len {
                let (head, rest) = split(left, at);
                (head, concat(rest, Some(right)))
            } else if at > left_len {
                let (rest, tail) = split(right, at - left_len);
                (concat(Some(left), rest), tail)
            } else {
                (Some(left), Some(right))
            }
        }
    }
}

/// 中央で二分しながら構築する。左右の葉数の差が 1 以下なので高さの差も 1 以下になる
fn build<C: Chunk, I: Iterator<Item = C>>(chunks: &mut I, count: usize) -> Link<C> {
    match count {
        0 => None,
        1 => chunks.next().map(Node::leaf),
        _ => {
            let half = count / 2;
            let left = build(chunks, half);
            let right = build(chunks, count - half);
            concat(left, right)
        }
    }
}

/// 右端の葉へ断片の取り込みを試みる。成功時は経路上の長さを更新
fn append_to_last<C: Chunk>(node: &mut Node<C>, chunk: &C) -> bool {
    match node {
        Node::Leaf(last) => last.try_append(chunk),
        Node::Branch { right, len, .. } => {
            if append_to_last(right, chunk) {
                *len += chunk.len();
                true
            } else {
                false
            }
        }
    }
}

fn visit<C, F>(node: &Node<C>, start: usize, end: usize, f: &mut F)
where
    C: Chunk,
    F: FnMut(&C, usize, usize),
{
    if start >= end {
        return;
    }
    match node {
        Node::Leaf(chunk) => f(chunk, start, end),
        Node::Branch { left, right, .. } => {
            let left_len = left.len();
            if start < left_len {
                visit(left, start, end.min(left_len), f);
            }
            if end > left_len {
                visit(right, start.saturating_sub(left_len), end - left_len, f);
            }
        }
    }
}

/// チャンク木本体
#[derive(Debug, Clone)]
pub(crate) struct ChunkTree<C> {
    root: Link<C>,
}

impl<C: Chunk> ChunkTree<C> {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// 断片列から平衡木を構築（空の断片は捨てる）
    pub fn from_chunks(chunks: Vec<C>) -> Self {
        let chunks: Vec<C> = chunks.into_iter().filter(|c| c.len() > 0).collect();
        let count = chunks.len();
        Self {
            root: build(&mut chunks.into_iter(), count),
        }
    }

    /// 全要素数（ルートのキャッシュ値）
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    /// `at` の位置に断片列を挿入する。`at <= len()` は呼び出し側で検証済みであること
    pub fn insert(&mut self, at: usize, chunks: Vec<C>) {
        let mut pending = chunks.into_iter().filter(|c| c.len() > 0).peekable();
        if pending.peek().is_none() {
            return;
        }

        let (mut head, tail) = match self.root.take() {
            Some(root) => split(root, at),
            None => (None, None),
        };

        // 直前の葉に収まる分は取り込み、断片化を防ぐ
        if let Some(head) = head.as_mut() {
            while let Some(chunk) = pending.peek() {
                if !append_to_last(head, chunk) {
                    break;
                }
                pending.next();
            }
        }

        let rest: Vec<C> = pending.collect();
        let count = rest.len();
        let middle = build(&mut rest.into_iter(), count);
        self.root = concat(concat(head, middle), tail);
    }

    /// `[start, end)` を取り除く。範囲は呼び出し側で検証済みであること
    pub fn remove(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let Some(root) = self.root.take() else {
            return;
        };
        let (front, tail) = split(root, end);
        let head = match front {
            Some(front) => split(front, start).0,
            None => None,
        };
        self.root = concat(head, tail);
    }

    /// `[start, end)` に掛かる断片を順に訪問する。コールバックには断片内の局所範囲を渡す
    pub fn for_each_in_range<F>(&self, start: usize, end: usize, mut f: F)
    where
        F: FnMut(&C, usize, usize),
    {
        if let Some(root) = &self.root {
            visit(root, start, end.min(root.len()), &mut f);
        }
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height() as usize)
    }

    #[cfg(test)]
    pub fn leaf_count(&self) -> usize {
        fn count<C>(node: &Node<C>) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Branch { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_deref().map_or(0, count)
    }

    /// 構造上の不変条件を検査（テスト用）
    #[cfg(test)]
    pub fn assert_invariants(&self) {
        fn check<C: Chunk>(node: &Node<C>) -> (usize, u8) {
            match node {
                Node::Leaf(chunk) => {
                    assert!(chunk.len() > 0, "empty leaf");
                    (chunk.len(), 0)
                }
                Node::Branch {
                    left,
                    right,
                    len,
                    height,
                } => {
                    let (ll, lh) = check(left);
                    let (rl, rh) = check(right);
                    assert_eq!(*len, ll + rl, "cached length mismatch");
                    assert_eq!(*height, lh.max(rh) + 1, "cached height mismatch");
                    assert!(lh.abs_diff(rh) <= 1, "unbalanced node: {} vs {}", lh, rh);
                    (*len, *height)
                }
            }
        }
        if let Some(root) = &self.root {
            check(root);
        }
    }
}

impl<C: Chunk> Default for ChunkTree<C> {
    fn default() -> Self {
        Self::new()
    }
}
