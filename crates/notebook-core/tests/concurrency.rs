//! Concurrency tests for the shared notebook.
//!
//! Many threads mutate one `Arc<Notebook>` at once; the registry must never
//! lose or duplicate groups, and churn on a single group must never corrupt it.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use notebook_core::{GroupKey, NoteSize, Notebook, NotebookError, SecurityLevel};

fn all_keys() -> Vec<GroupKey> {
    NoteSize::all()
        .flat_map(|size| SecurityLevel::all().map(move |level| GroupKey::new(size, level)))
        .collect()
}

#[test]
fn test_concurrent_adds_to_distinct_keys() {
    let keys = all_keys();
    let notebook = Arc::new(Notebook::new());
    let barrier = Arc::new(Barrier::new(keys.len()));

    let handles: Vec<_> = keys
        .iter()
        .copied()
        .map(|key| {
            let notebook = Arc::clone(&notebook);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let content = vec![key.level.get(); key.content_len()];
                notebook.add_note(key, content).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = notebook.stats();
    assert_eq!(stats.groups, keys.len());
    assert_eq!(stats.notes, keys.len());

    let live: HashSet<GroupKey> = notebook.keys().into_iter().collect();
    assert_eq!(live.len(), keys.len(), "duplicate group keys in registry");
    for key in keys {
        assert_eq!(notebook.group_len(key), Some(1));
    }
}

#[test]
fn test_concurrent_adds_to_same_key_create_one_group() {
    let key = GroupKey::parse(256, 3).unwrap();
    let notebook = Arc::new(Notebook::new());
    let threads = 16;
    let per_thread = 50;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let notebook = Arc::clone(&notebook);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..per_thread {
                    notebook.add_note(key, vec![0; 256]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(notebook.keys(), vec![key]);
    assert_eq!(notebook.group_len(key), Some(threads * per_thread));
}

#[test]
fn test_add_delete_churn_on_shared_group() {
    let key = GroupKey::parse(512, 0).unwrap();
    let notebook = Arc::new(Notebook::new());
    let adders = 4;
    let deleters = 4;
    let per_thread = 200;
    let barrier = Arc::new(Barrier::new(adders + deleters));

    let mut handles = Vec::new();
    for i in 0..adders {
        let notebook = Arc::clone(&notebook);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..per_thread {
                notebook.add_note(key, vec![i as u8; 512]).unwrap();
            }
            0usize
        }));
    }
    for _ in 0..deleters {
        let notebook = Arc::clone(&notebook);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut deleted = 0;
            for _ in 0..per_thread {
                match notebook.delete_note(key, 0) {
                    Ok(_) => deleted += 1,
                    Err(NotebookError::GroupNotFound(_)) => {}
                    Err(e) => panic!("unexpected delete error: {e}"),
                }
                // Readers interleave with the writers
                match notebook.show_note(key, 0) {
                    Ok(content) => assert_eq!(content.len(), 512),
                    Err(NotebookError::GroupNotFound(_)) => {}
                    Err(e) => panic!("unexpected show error: {e}"),
                }
            }
            deleted
        }));
    }

    let deleted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let added = adders * per_thread;
    let remaining = notebook.group_len(key).unwrap_or(0);

    assert_eq!(added - deleted, remaining);
    assert!(notebook.keys().len() <= 1);
    if remaining == 0 {
        assert!(!notebook.contains_group(key));
    }
}

#[test]
fn test_concurrent_edits_never_mix_content() {
    let key = GroupKey::parse(4096, 6).unwrap();
    let notebook = Arc::new(Notebook::new());
    notebook.add_note(key, vec![0; 4096]).unwrap();

    let writers = 4;
    let barrier = Arc::new(Barrier::new(writers + 1));
    let mut handles = Vec::new();
    for i in 0..writers {
        let notebook = Arc::clone(&notebook);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let content = vec![i as u8 + 1; 4096];
            for _ in 0..100 {
                notebook.edit_note(key, 0, &content).unwrap();
            }
        }));
    }

    let reader = {
        let notebook = Arc::clone(&notebook);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..400 {
                let content = notebook.show_note(key, 0).unwrap();
                let first = content[0];
                assert!(content.iter().all(|b| *b == first), "torn note content");
            }
        })
    };

    for handle in handles {
        handle.join().unwrap();
    }
    reader.join().unwrap();
}
