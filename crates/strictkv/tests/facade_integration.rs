//! Facade contract tests against the in-memory store

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use strictkv::{ErrorKind, Facade, KvError, MemoryStore, StoreError};

const TTL: Duration = Duration::from_secs(60);
const SHORT_TTL: Duration = Duration::from_millis(100);

fn facade() -> Facade<MemoryStore> {
    Facade::new(MemoryStore::new())
}

#[tokio::test]
async fn test_create_then_read_until_expiry() {
    let kv = facade();

    kv.create_string_ttl("session", "token", SHORT_TTL).await.unwrap();
    kv.create_int_ttl("counter", 7, SHORT_TTL).await.unwrap();
    assert_eq!(kv.get_string("session").await.unwrap(), "token");
    assert_eq!(kv.get_int("counter").await.unwrap(), 7);

    tokio::time::sleep(SHORT_TTL * 2).await;

    let err = kv.get_string("session").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    let err = kv.increment("counter").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);

    // Expired keys can be created again
    kv.create_string_ttl("session", "fresh", TTL).await.unwrap();
    assert_eq!(kv.get_string("session").await.unwrap(), "fresh");
}

#[tokio::test]
async fn test_update_resets_ttl() {
    let kv = facade();

    kv.create_string_ttl("k", "v1", SHORT_TTL).await.unwrap();
    kv.update_string_ttl("k", "v2", TTL).await.unwrap();

    tokio::time::sleep(SHORT_TTL * 2).await;
    assert_eq!(kv.get_string("k").await.unwrap(), "v2");
}

#[tokio::test]
async fn test_create_on_present_key_fails_for_every_type() {
    let kv = facade();
    kv.create_string_ttl("taken", "x", TTL).await.unwrap();

    let errors = vec![
        kv.create_string_ttl("taken", "y", TTL).await.unwrap_err(),
        kv.create_int_ttl("taken", 1, TTL).await.unwrap_err(),
        kv.create_float_ttl("taken", 1.0, TTL).await.unwrap_err(),
        kv.create_json_ttl("taken", &vec![1, 2], TTL).await.unwrap_err(),
        kv.create_list("taken", &["a"]).await.unwrap_err(),
    ];
    for err in errors {
        assert!(err.is_already_exists(), "unexpected error: {}", err);
    }
    assert_eq!(kv.get_string("taken").await.unwrap(), "x");
}

#[tokio::test]
async fn test_update_on_absent_key_fails() {
    let kv = facade();

    let err = kv.update_string_ttl("ghost", "v", TTL).await.unwrap_err();
    assert!(err.is_not_found());
    let err = kv.update_json_ttl("ghost", &"v", TTL).await.unwrap_err();
    assert!(err.is_not_found());
    let err = kv.replace_string("ghost", "v").await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(kv.exists("ghost").await.unwrap(), 0);
}

#[tokio::test]
async fn test_multi_get_on_unwritten_keys() {
    let kv = facade();

    let keys = ["x", "y", "z"];
    let values = kv.get_strings(&keys).await.unwrap();
    assert_eq!(values.len(), keys.len());
    assert!(values.iter().all(String::is_empty));

    let mut data = HashMap::new();
    data.insert("y".to_string(), "2".to_string());
    kv.set_strings(&data).await.unwrap();

    let values = kv.get_strings(&keys).await.unwrap();
    assert_eq!(values, vec!["", "2", ""]);
}

#[tokio::test]
async fn test_counter_semantics() {
    let kv = facade();

    let err = kv.increment("hits").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);

    kv.put_string_ttl("hits", "123", TTL).await.unwrap();
    assert_eq!(kv.increment("hits").await.unwrap(), 124);

    kv.put_string_ttl("hits", "abc", TTL).await.unwrap();
    let err = kv.increment("hits").await.unwrap_err();
    assert!(matches!(err.store_error(), Some(StoreError::NotANumber)));
}

#[tokio::test]
async fn test_list_left_push_order() {
    let kv = facade();

    kv.create_list("queue", &["A", "B", "C"]).await.unwrap();
    assert_eq!(kv.pop_left("queue").await.unwrap(), "C");
    assert_eq!(kv.pop_left("queue").await.unwrap(), "B");
    assert_eq!(kv.pop_left("queue").await.unwrap(), "A");

    let err = kv.pop_left("queue").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    assert_eq!(kv.exists("queue").await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_range_read() {
    let kv = facade();
    kv.create_list("queue", &["A", "B", "C"]).await.unwrap();

    let slice = kv.list_range("queue", 0, 1).await.unwrap();
    assert_eq!(slice, vec!["C", "B"]);

    for (start, stop) in [(1, 1), (2, 0), (-1, 2), (0, -2)] {
        let err = kv.list_range("queue", start, stop).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index, "range [{}, {}]", start, stop);
    }
    let err = kv.list_range("queue", 1, 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Index);
}

#[tokio::test]
async fn test_move_between_lists() {
    let kv = facade();
    kv.create_list("todo", &["write", "test", "write"]).await.unwrap();

    kv.create_list("done", &["old"]).await.unwrap();
    let err = kv.move_to_new_list("todo", "done", "write").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyAlreadyExists);

    let err = kv.move_to_new_list("todo", "doing", "ship").await.unwrap_err();
    match err {
        KvError::ValueNotFound { key, value, .. } => {
            assert_eq!(key, "todo");
            assert_eq!(value, "ship");
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(kv.move_to_new_list("todo", "doing", "write").await.unwrap(), 1);
    assert_eq!(kv.list_len("todo").await.unwrap(), 2);
    assert_eq!(kv.list_range("doing", 0, 0).await.unwrap_err().kind(), ErrorKind::Index);
    assert_eq!(kv.pop_left("doing").await.unwrap(), "write");
}

#[tokio::test]
async fn test_delete_counts() {
    let kv = facade();
    kv.create_string_ttl("a", "1", TTL).await.unwrap();
    kv.create_list("b", &["x"]).await.unwrap();

    assert_eq!(kv.delete_many(&["a", "b", "c"]).await.unwrap(), 2);
    let err = kv.delete_many(&["a", "b", "c"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KeyNotFound);
}

#[tokio::test]
async fn test_concurrent_creates_have_one_winner() {
    let kv = Arc::new(facade());

    let mut handles = Vec::new();
    for i in 0..16 {
        let kv = kv.clone();
        handles.push(tokio::spawn(async move {
            kv.create_string_ttl("leader", &format!("node-{}", i), TTL)
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => winners += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::KeyAlreadyExists),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_closed_store_reports_store_errors() {
    let kv = facade();
    kv.create_string_ttl("k", "v", TTL).await.unwrap();
    kv.close().await.unwrap();

    let err = kv.get_string("k").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(matches!(err.store_error(), Some(StoreError::Closed)));
    assert_eq!(err.op(), Some("get_string"));
}
