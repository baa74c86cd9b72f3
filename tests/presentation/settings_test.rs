use docpipe::presentation::config::{
    LlmProviderSetting, PersistenceProviderSetting, QueueProviderSetting, Settings,
};
use docpipe::presentation::{Environment, Role};

#[test]
fn given_test_environment_when_loading_then_in_memory_single_process() {
    let settings = Settings::load(Environment::Test).unwrap();

    assert_eq!(settings.role, Role::All);
    assert_eq!(settings.database.provider, PersistenceProviderSetting::Memory);
    assert_eq!(settings.queue.provider, QueueProviderSetting::Memory);
    assert_eq!(settings.llm.provider, LlmProviderSetting::Mock);
    assert!(!settings.needs_database());
}

#[test]
fn given_roles_when_queried_then_split_http_and_dispatcher() {
    assert!(Role::Web.serves_http());
    assert!(!Role::Web.runs_dispatcher());
    assert!(Role::Worker.runs_dispatcher());
    assert!(!Role::Worker.serves_http());
    assert!(Role::All.serves_http() && Role::All.runs_dispatcher());
}

#[test]
fn given_configured_worker_id_when_resolving_then_used_verbatim() {
    let mut settings = Settings::load(Environment::Test).unwrap();
    settings.worker.worker_id = Some("worker-7".to_string());

    assert_eq!(settings.worker.resolved_worker_id(), "worker-7");
}
