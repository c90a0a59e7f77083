use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use texted::buffer::BufferType;
use texted::error::ErrorKind;
use texted::factory::{BufferPolicy, DocumentFactory};
use texted::{CursorState, DocumentManager};

const ALL_TYPES: [BufferType; 3] = [BufferType::Simple, BufferType::Rope, BufferType::PieceTable];

#[test]
fn test_insert_into_empty_document() {
    let manager = DocumentManager::new();
    for buffer_type in ALL_TYPES {
        let doc = manager.create_document(None, None, Some(buffer_type)).unwrap();
        let state = doc.insert(Some(0), "Hello", true).unwrap();
        assert_eq!(doc.contents().unwrap(), "Hello");
        assert_eq!(state, CursorState { cursor_position: 5, length: 5 });
    }
}

#[test]
fn test_delete_with_cursor_inside_range() {
    let manager = DocumentManager::new();
    let doc = manager
        .create_document(Some("hw"), Some("Hello World"), None)
        .unwrap();
    doc.set_cursor_position(10).unwrap();
    let state = doc.delete(6, 11, false).unwrap();
    assert_eq!(doc.contents().unwrap(), "Hello ");
    assert_eq!(state.cursor_position, 6);
}

#[test]
fn test_delete_before_cursor() {
    let manager = DocumentManager::new();
    let doc = manager
        .create_document(Some("alpha"), Some("ABCDEFGHIJ"), Some(BufferType::Rope))
        .unwrap();
    doc.set_cursor_position(9).unwrap();
    let state = doc.delete(0, 3, false).unwrap();
    assert_eq!(doc.contents().unwrap(), "DEFGHIJ");
    assert_eq!(state.cursor_position, 6);
}

#[test]
fn test_policy_driven_buffer_selection() {
    let policy = BufferPolicy {
        default_type: BufferType::Simple,
        large_document_type: BufferType::PieceTable,
        large_document_threshold: Some(1024),
    };
    let manager = DocumentManager::with_factory(DocumentFactory::with_policy(policy));
    let small = manager.create_document(None, Some("tiny"), None).unwrap();
    let large = manager
        .create_document(None, Some("x".repeat(2048).as_str()), None)
        .unwrap();
    assert_eq!(small.info().unwrap().buffer_type, BufferType::Simple);
    assert_eq!(large.info().unwrap().buffer_type, BufferType::PieceTable);
}

#[test]
fn test_concurrent_duplicate_create_yields_one_winner() {
    const THREADS: usize = 16;

    let manager = Arc::new(DocumentManager::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                manager.create_document(Some("contested"), Some(format!("writer {}", i).as_str()), None)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::AlreadyExists))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(duplicates, THREADS - 1);
    assert_eq!(manager.count(), 1);
}

#[test]
fn test_concurrent_generated_ids_are_unique() {
    let manager = Arc::new(DocumentManager::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                (0..50)
                    .map(|_| manager.create_document(None, None, None).unwrap().id().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(ids.len(), 400);
    assert_eq!(manager.count(), 400);
    assert!(ids.contains("doc-1") && ids.contains("doc-400"));
}

#[test]
fn test_concurrent_edits_keep_cursor_consistent() {
    let manager = Arc::new(DocumentManager::new());
    for buffer_type in ALL_TYPES {
        let doc = manager.create_document(None, None, Some(buffer_type)).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let doc = Arc::clone(&doc);
                thread::spawn(move || {
                    for i in 0..200 {
                        if (i + t) % 3 == 0 {
                            let len = doc.len().unwrap();
                            // 他スレッドとの競合で範囲外になり得るのでエラーは許容
                            let _ = doc.delete(len / 2, (len / 2 + 2).min(len), false);
                        } else {
                            let state = doc.insert(None, "ab", i % 2 == 0).unwrap();
                            assert!(state.cursor_position <= state.length);
                        }
                        doc.move_cursor(if i % 2 == 0 { -3 } else { 5 }).unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let doc = Arc::clone(&doc);
            thread::spawn(move || {
                for _ in 0..500 {
                    let info = doc.info().unwrap();
                    assert!(info.cursor_position <= info.length);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        let state = doc.cursor_state().unwrap();
        assert!(state.cursor_position <= state.length);
        assert_eq!(doc.contents().unwrap().chars().count(), state.length);
    }
}

#[test]
fn test_closed_ids_can_be_recreated() {
    let manager = DocumentManager::new();
    manager.create_document(Some("session"), Some("first"), None).unwrap();
    assert!(manager.has_document("session"));
    manager.close_document("session").unwrap();
    assert_eq!(manager.list_ids(), Vec::<String>::new());

    let doc = manager
        .create_document(Some("session"), Some("second"), None)
        .unwrap();
    assert_eq!(doc.contents().unwrap(), "second");
    assert_eq!(manager.list_ids(), vec!["session".to_string()]);
}
