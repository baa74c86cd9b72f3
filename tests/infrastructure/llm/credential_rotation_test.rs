use std::sync::Arc;

use docpipe::infrastructure::llm::CredentialRotation;

#[test]
fn given_same_observation_when_advanced_twice_then_rotates_once() {
    let pool = CredentialRotation::from_csv("a,b,c").unwrap();
    let (observed, _) = pool.current();

    assert_eq!(pool.advance_from(observed), 1);
    assert_eq!(pool.advance_from(observed), 1);
    assert_eq!(pool.rotation_count(), 1);
    assert_eq!(pool.current(), (1, "b"));
}

#[test]
fn given_many_threads_when_advancing_from_same_observation_then_rotates_once() {
    let pool = Arc::new(CredentialRotation::from_csv("a,b,c").unwrap());
    let (observed, _) = pool.current();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            std::thread::spawn(move || pool.advance_from(observed))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }

    assert_eq!(pool.rotation_count(), 1);
}

#[test]
fn given_last_key_when_advancing_then_wraps_to_first() {
    let pool = CredentialRotation::from_csv("a, b").unwrap();

    pool.advance_from(0);
    pool.advance_from(1);

    assert_eq!(pool.current(), (0, "a"));
}

#[test]
fn given_blank_key_list_when_parsing_then_rejected() {
    assert!(CredentialRotation::from_csv(" , ").is_none());
}
