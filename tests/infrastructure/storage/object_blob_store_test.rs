use bytes::Bytes;
use docpipe::application::ports::{BlobStore, BlobStoreError};
use docpipe::domain::{RunId, StorageLocator};
use docpipe::infrastructure::storage::ObjectBlobStore;

#[tokio::test]
async fn given_uploaded_blob_when_fetching_by_locator_then_same_bytes() {
    let store = ObjectBlobStore::in_memory();
    let key = StorageLocator::upload_key(&RunId::new(), "resume.pdf");

    let locator = store
        .put(&key, Bytes::from_static(b"%PDF-1.7 fake"))
        .await
        .unwrap();
    let data = store.get(&locator).await.unwrap();

    assert_eq!(locator.as_str(), key);
    assert_eq!(data, b"%PDF-1.7 fake");
}

#[tokio::test]
async fn given_unknown_locator_when_fetching_then_not_found() {
    let store = ObjectBlobStore::in_memory();

    let result = store.get(&StorageLocator::from_raw("runs/missing/file.txt")).await;

    assert!(matches!(result, Err(BlobStoreError::NotFound(_))));
}

#[tokio::test]
async fn given_local_backend_when_round_tripping_then_written_under_base_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectBlobStore::local(dir.path().to_path_buf()).unwrap();

    let locator = store
        .put("runs/run_abc/resume.txt", Bytes::from_static(b"plain resume"))
        .await
        .unwrap();

    assert!(dir.path().join("runs/run_abc/resume.txt").exists());
    assert_eq!(store.get(&locator).await.unwrap(), b"plain resume");
}
