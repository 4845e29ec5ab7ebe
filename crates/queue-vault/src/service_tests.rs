//! Tests for the service facade.

use super::*;
use crate::properties::{LoggingProperties, MetricsProperties, RetentionPolicy};

fn service() -> QueueService {
    QueueService::new()
}

#[tokio::test]
async fn test_invalid_queue_name_is_rejected_at_the_boundary() {
    let service = service();

    let result = service.create_queue("a", None).await;
    assert!(matches!(result, Err(QueueError::InvalidQueueName { .. })));

    let result = service.peek_messages("bad name", 1).await;
    assert!(matches!(result, Err(QueueError::InvalidQueueName { .. })));
}

#[tokio::test]
async fn test_queue_names_are_case_insensitive_through_the_facade() {
    let service = service();
    service.create_queue("Orders", None).await.unwrap();

    assert!(service.queue_exists("ORDERS").await.unwrap());

    let result = service.create_queue("orders", None).await;
    assert!(matches!(
        result,
        Err(QueueError::QueueAlreadyExists { .. })
    ));
}

#[tokio::test]
async fn test_enqueue_retrieve_delete_round_trip() {
    let service = service();
    service.create_queue("jobs", None).await.unwrap();

    let receipt = service
        .enqueue_message("jobs", Bytes::from_static(b"job-1"), EnqueueOptions::new())
        .await
        .unwrap();

    let retrieved = service
        .retrieve_messages("jobs", 1, Duration::seconds(30))
        .await
        .unwrap();
    assert_eq!(retrieved.len(), 1);
    assert_eq!(retrieved[0].message_id, receipt.message_id);
    assert_eq!(retrieved[0].body.as_ref(), b"job-1");

    service
        .delete_message("jobs", &retrieved[0].message_id, &retrieved[0].pop_receipt)
        .await
        .unwrap();

    let remaining = service.peek_messages("jobs", 32).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_retrieve_never_blocks_on_empty_queue() {
    let service = service();
    service.create_queue("empty", None).await.unwrap();

    let retrieved = service
        .retrieve_messages("empty", 32, Duration::seconds(5))
        .await
        .unwrap();
    assert!(retrieved.is_empty());
}

#[tokio::test]
async fn test_get_queue_metadata_includes_approximate_count() {
    let service = service();
    let metadata: MetadataMap = [("key", "value")].into_iter().collect();
    service
        .create_queue("meta", Some(metadata))
        .await
        .unwrap();
    for _ in 0..3 {
        service
            .enqueue_message("meta", Bytes::from_static(b"m"), EnqueueOptions::new())
            .await
            .unwrap();
    }

    let result = service.get_queue_metadata("meta").await.unwrap();
    assert_eq!(result.metadata.get("key"), Some("value"));
    assert_eq!(result.approximate_message_count, 3);
}

#[tokio::test]
async fn test_set_service_properties_with_zero_retention_days_fails() {
    let service = service();

    let properties = ServiceProperties {
        logging: LoggingProperties {
            retention_policy: RetentionPolicy::for_days(0),
            ..LoggingProperties::default()
        },
        metrics: MetricsProperties::default(),
    };

    let result = service.set_service_properties(properties).await;
    assert!(matches!(result, Err(QueueError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_service_properties_get_set_revert_cycle() {
    let service = service();
    let original = service.get_service_properties().await.unwrap();

    let replacement = ServiceProperties {
        logging: LoggingProperties {
            read: true,
            write: true,
            delete: true,
            retention_policy: RetentionPolicy::for_days(10),
            ..LoggingProperties::default()
        },
        metrics: MetricsProperties {
            enabled: true,
            include_apis: true,
            retention_policy: RetentionPolicy::for_days(10),
            ..MetricsProperties::default()
        },
    };
    service
        .set_service_properties(replacement.clone())
        .await
        .unwrap();
    assert_eq!(service.get_service_properties().await.unwrap(), replacement);

    assert!(service.revert_service_properties().await);
    assert_eq!(service.get_service_properties().await.unwrap(), original);
}

#[tokio::test]
async fn test_service_is_usable_through_trait_object() {
    let service: Box<dyn QueueApi> = Box::new(QueueService::new());

    service.create_queue("boxed", None).await.unwrap();
    service
        .enqueue_message("boxed", Bytes::from_static(b"x"), EnqueueOptions::new())
        .await
        .unwrap();

    let queues = service.list_queues(Some("box")).await.unwrap();
    assert_eq!(queues.len(), 1);
    assert_eq!(queues[0].name.as_str(), "boxed");
}

#[tokio::test]
async fn test_background_mode_spawns_and_stops_sweeper() {
    let limits = ServiceLimits {
        reconcile: ReconcileMode::Background { interval_secs: 1 },
        ..ServiceLimits::default()
    };
    let service = QueueService::with_limits(limits);
    service.create_queue("swept", None).await.unwrap();

    // Dropping the service aborts the sweeper task.
    drop(service);
}
