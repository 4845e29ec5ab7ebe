//! Integration tests for queue lifecycle through the service facade.

use queue_vault::{MetadataMap, QueueApi, QueueError, QueueService};

#[tokio::test]
async fn test_create_list_delete_many_queues() {
    let service = QueueService::new();

    for i in 1..=5 {
        service
            .create_queue(&format!("sample-{i}"), None)
            .await
            .unwrap();
    }
    service.create_queue("other", None).await.unwrap();

    let listed = service.list_queues(Some("sample-")).await.unwrap();
    assert_eq!(listed.len(), 5);
    let names: Vec<&str> = listed.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["sample-1", "sample-2", "sample-3", "sample-4", "sample-5"]
    );

    for i in 1..=5 {
        service.delete_queue(&format!("sample-{i}")).await.unwrap();
    }
    assert!(service.list_queues(Some("sample-")).await.unwrap().is_empty());
    assert_eq!(service.list_queues(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_create_then_delete_then_metadata_lookup() {
    let service = QueueService::new();

    service.create_queue("q1", None).await.unwrap();
    let duplicate = service.create_queue("q1", None).await;
    assert!(matches!(
        duplicate,
        Err(QueueError::QueueAlreadyExists { .. })
    ));

    service.delete_queue("q1").await.unwrap();
    let metadata = service.get_queue_metadata("q1").await;
    assert!(matches!(metadata, Err(QueueError::QueueNotFound { .. })));
}

#[tokio::test]
async fn test_metadata_set_get_round_trip() {
    let service = QueueService::new();
    service.create_queue("meta", None).await.unwrap();

    let metadata: MetadataMap = [("key", "value"), ("foo", "bar"), ("baz", "boo")]
        .into_iter()
        .collect();
    service.set_queue_metadata("meta", metadata).await.unwrap();

    let result = service.get_queue_metadata("meta").await.unwrap();
    assert_eq!(result.metadata.len(), 3);
    assert_eq!(result.metadata.get("key"), Some("value"));
    assert_eq!(result.metadata.get("FOO"), Some("bar"));
    assert_eq!(result.approximate_message_count, 0);

    // Full replace, not merge.
    let replacement: MetadataMap = [("only", "this")].into_iter().collect();
    service
        .set_queue_metadata("meta", replacement)
        .await
        .unwrap();
    let result = service.get_queue_metadata("meta").await.unwrap();
    assert_eq!(result.metadata.len(), 1);
    assert!(result.metadata.get("key").is_none());
}

#[tokio::test]
async fn test_deleting_queue_discards_messages() {
    let service = QueueService::new();
    service.create_queue("doomed", None).await.unwrap();
    service
        .enqueue_message(
            "doomed",
            bytes::Bytes::from_static(b"m"),
            queue_vault::EnqueueOptions::new(),
        )
        .await
        .unwrap();

    service.delete_queue("doomed").await.unwrap();
    service.create_queue("doomed", None).await.unwrap();

    let peeked = service.peek_messages("doomed", 32).await.unwrap();
    assert!(peeked.is_empty());
}
