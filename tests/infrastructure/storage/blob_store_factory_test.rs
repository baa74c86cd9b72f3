use bytes::Bytes;
use docpipe::application::ports::BlobStoreError;
use docpipe::infrastructure::storage::BlobStoreFactory;
use docpipe::presentation::config::{StorageProviderSetting, StorageSettings};

#[tokio::test]
async fn given_memory_provider_when_creating_then_store_usable() {
    let settings = StorageSettings {
        provider: StorageProviderSetting::Memory,
        ..StorageSettings::default()
    };

    let store = BlobStoreFactory::create(&settings).unwrap();
    let locator = store.put("runs/x/a.txt", Bytes::from_static(b"a")).await.unwrap();

    assert_eq!(store.get(&locator).await.unwrap(), b"a");
}

#[test]
fn given_azure_provider_without_account_when_creating_then_configuration_error() {
    let settings = StorageSettings {
        provider: StorageProviderSetting::Azure,
        ..StorageSettings::default()
    };

    let result = BlobStoreFactory::create(&settings);

    assert!(matches!(result, Err(BlobStoreError::Configuration(_))));
}
