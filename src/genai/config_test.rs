use super::*;
use std::sync::{Mutex, MutexGuard};

/// Serializes the tests in this file — they all mutate process env.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`ENV_LOCK`] to avoid env races.
unsafe fn clear_gen_env() {
    unsafe {
        std::env::remove_var("GEN_API_KEY_ENV");
        std::env::remove_var("GEN_BASE_URL");
        std::env::remove_var("GEN_TEXT_MODEL");
        std::env::remove_var("GEN_IMAGE_MODEL");
        std::env::remove_var("GEN_VIDEO_MODEL");
        std::env::remove_var("GEN_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("GEN_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("GEN_POLL_INTERVAL_MS");
        std::env::remove_var("GEN_POLL_MAX_ATTEMPTS");
        std::env::remove_var("GEN_POLL_BACKOFF");
        std::env::remove_var("TEST_GEN_KEY");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe {
        clear_gen_env();
        std::env::set_var("GEN_API_KEY_ENV", "TEST_GEN_KEY");
        std::env::set_var("TEST_GEN_KEY", "secret");
    }

    let cfg = GenConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.text_model, DEFAULT_TEXT_MODEL);
    assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
    assert_eq!(cfg.video_model, DEFAULT_VIDEO_MODEL);
    assert_eq!(
        cfg.timeouts,
        GenTimeouts { request_secs: DEFAULT_GEN_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_GEN_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.poll, PollPolicy::default());

    unsafe { clear_gen_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_gen_env();
        std::env::set_var("GEN_API_KEY_ENV", "TEST_GEN_KEY");
        std::env::set_var("TEST_GEN_KEY", "secret");
        std::env::set_var("GEN_BASE_URL", "https://proxy.example/v1beta/");
        std::env::set_var("GEN_TEXT_MODEL", "gemini-next");
        std::env::set_var("GEN_POLL_INTERVAL_MS", "500");
        std::env::set_var("GEN_POLL_MAX_ATTEMPTS", "5");
        std::env::set_var("GEN_POLL_BACKOFF", "linear");
    }

    let cfg = GenConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://proxy.example/v1beta");
    assert_eq!(cfg.text_model, "gemini-next");
    assert_eq!(cfg.poll, PollPolicy { interval_ms: 500, max_attempts: 5, backoff: Backoff::Linear });

    unsafe { clear_gen_env() };
}

#[test]
fn from_env_missing_key_indirection_errors() {
    let _guard = env_lock();
    unsafe { clear_gen_env() };

    let err = GenConfig::from_env().unwrap_err();
    assert!(matches!(err, GenError::MissingApiKey { ref var } if var == "GEN_API_KEY_ENV"));
}

#[test]
fn from_env_missing_named_key_errors() {
    let _guard = env_lock();
    unsafe {
        clear_gen_env();
        std::env::set_var("GEN_API_KEY_ENV", "TEST_GEN_KEY");
    }

    let err = GenConfig::from_env().unwrap_err();
    assert!(matches!(err, GenError::MissingApiKey { ref var } if var == "TEST_GEN_KEY"));

    unsafe { clear_gen_env() };
}

#[test]
fn from_env_unknown_backoff_errors() {
    let _guard = env_lock();
    unsafe {
        clear_gen_env();
        std::env::set_var("GEN_API_KEY_ENV", "TEST_GEN_KEY");
        std::env::set_var("TEST_GEN_KEY", "secret");
        std::env::set_var("GEN_POLL_BACKOFF", "exponential");
    }

    let err = GenConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unsupported GEN_POLL_BACKOFF"));

    unsafe { clear_gen_env() };
}
