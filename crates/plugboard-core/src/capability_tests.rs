use super::*;
use crate::testing::{EventLog, OtherService, RecordingService};

#[test]
fn test_handle_downcast_to_concrete_type() {
    let log = EventLog::new();
    let service = Arc::new(RecordingService::new("clock", &log));
    let handle = ServiceHandle::new(service.clone());

    assert!(handle.is::<RecordingService>());
    assert!(!handle.is::<OtherService>());

    let back = handle.downcast::<RecordingService>().unwrap();
    assert!(Arc::ptr_eq(&back, &service));
    assert!(handle.downcast::<OtherService>().is_none());
}

#[test]
fn test_handle_identity() {
    let log = EventLog::new();
    let a = Arc::new(RecordingService::new("a", &log));
    let b = Arc::new(RecordingService::new("a", &log));

    let first = ServiceHandle::new(a.clone());
    let again = ServiceHandle::from(a);
    let other = ServiceHandle::new(b);

    assert!(first.ptr_eq(&again));
    assert!(first.ptr_eq(&first.clone()));
    assert!(!first.ptr_eq(&other));
}

#[test]
fn test_handle_name_and_type() {
    let handle = ResourceHandle::new(Arc::new(BasicResource::new("root")));
    assert_eq!(handle.name(), "root");
    assert!(handle.type_name().ends_with("BasicResource"));

    let debug = format!("{:?}", handle);
    assert!(debug.contains("root"));
}

#[test]
fn test_basic_resource() {
    let resource = BasicResource::new("db").with_description("Primary database");
    assert_eq!(resource.name(), "db");
    assert_eq!(resource.description(), "Primary database");
    assert_eq!(BasicResource::new("bare").description(), "");
}

#[tokio::test]
async fn test_default_lifecycle_is_noop() {
    let registry = Registry::new();
    let resource = BasicResource::new("db");
    assert!(resource.start(&registry).await.is_ok());
    assert!(resource.stop(&registry).await.is_ok());
}

#[tokio::test]
async fn test_default_status_is_unimplemented() {
    let registry = Registry::new();
    let resource = BasicResource::new("db");

    let err = resource.status(&registry).await.unwrap_err();
    assert!(err.is_unimplemented());
    assert!(err.to_string().contains("db"));
}

#[tokio::test]
async fn test_default_streams_are_empty() {
    use futures::StreamExt;

    let registry = Registry::new();
    let service = Arc::new(OtherService::new("plain"));

    let memories: Vec<_> = service.clone().memories(&registry).collect().await;
    let attention: Vec<_> = service.attention_items(&registry).collect().await;
    assert!(memories.is_empty());
    assert!(attention.is_empty());
}

#[tokio::test]
async fn test_streams_are_fresh_per_call() {
    use futures::StreamExt;

    let log = EventLog::new();
    let registry = Registry::new();
    let service = Arc::new(RecordingService::new("notes", &log).with_memories(&["a", "b"]));

    let first: Vec<_> = service.clone().memories(&registry).collect().await;
    let second: Vec<_> = service.memories(&registry).collect().await;
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(first[0].content, "notes:a");
}
