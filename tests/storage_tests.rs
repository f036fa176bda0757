use announcement_board::{
    config::{StoreBackend, StoreConfig},
    error::StoreError,
    storage::{self, KvStore, MemoryKvStore, S3KvStore},
};
use serde_json::json;

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryKvStore::new();
        store.put("a", &json!({"title": "A"})).await.unwrap();

        let value = store.get("a").await.unwrap();
        assert_eq!(value, Some(json!({"title": "A"})));

        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_none_and_delete_is_idempotent() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert!(store.delete("nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryKvStore::new();
        store.put("a", &json!(1)).await.unwrap();
        store.put("a", &json!(2)).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_list_is_lexicographic_and_limited() {
        let store = MemoryKvStore::new();
        for key in ["c", "a", "b"] {
            store.put(key, &json!({})).await.unwrap();
        }

        assert_eq!(store.list(10).await.unwrap(), vec!["a", "b", "c"]);
        assert_eq!(store.list(2).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let store = MemoryKvStore::new_failing();
        assert!(matches!(
            store.list(10).await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(store.get("a").await.is_err());
        assert!(store.put("a", &json!({})).await.is_err());
        assert!(store.delete("a").await.is_err());
    }

    #[tokio::test]
    async fn test_failing_key_only_affects_that_read() {
        let store = MemoryKvStore::new().with_failing_key("bad");
        store.put("bad", &json!({})).await.unwrap();
        store.put("good", &json!({})).await.unwrap();

        assert!(matches!(
            store.get("bad").await,
            Err(StoreError::Backend { .. })
        ));
        assert!(store.get("good").await.unwrap().is_some());
        assert_eq!(store.list(10).await.unwrap(), vec!["bad", "good"]);
    }
}

#[cfg(test)]
mod connect_tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_backend_binds_nothing() {
        let config = StoreConfig {
            backend: StoreBackend::Disabled,
            ..StoreConfig::default()
        };
        assert!(storage::connect(&config).await.is_none());
    }

    #[tokio::test]
    async fn test_memory_backend_is_ready_to_use() {
        let store = storage::connect(&StoreConfig::default())
            .await
            .expect("memory store should bind");
        store.put("k", &json!({"v": 1})).await.unwrap();
        assert_eq!(store.list(10).await.unwrap(), vec!["k"]);
    }
}

#[cfg(test)]
mod s3_tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_client_creation() {
        // Building the client performs no network I/O.
        let _client = S3KvStore::new(
            "http://localhost:9000",
            "us-east-1",
            "access",
            "secret",
            "announcements",
            "announcements/",
        );
    }
}
