//! End-to-end record encryption tests against a live session.

use pretty_assertions::assert_eq;
use solace_crypto::KdfParams;
use solace_records::{
    EncryptionService, GoalDraft, JournalEntryDraft, RecordError,
};
use solace_session::{SecurityPrefs, SessionLock};
use std::sync::Arc;

fn fast_kdf() -> KdfParams {
    KdfParams {
        m_cost: 8,
        t_cost: 1,
        p_cost: 1,
    }
}

async fn unlocked_service(identity: &str, password: &str) -> EncryptionService {
    let session = Arc::new(SessionLock::with_kdf_params(
        identity,
        SecurityPrefs::default(),
        fast_kdf(),
    ));
    session.probe_capability().await.unwrap();
    session.unlock(password).await.unwrap();
    EncryptionService::with_session(session)
}

fn sample_entry() -> JournalEntryDraft {
    JournalEntryDraft {
        content: "Hello".into(),
        html_content: Some("<p>Hello</p>".into()),
        prompt: Some("How do you feel?".into()),
    }
}

// ── Journal entries ──

#[tokio::test]
async fn journal_entry_roundtrip_with_all_fields() {
    let svc = unlocked_service("user@example.com", "hunter22").await;

    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();
    assert_eq!(record.word_count, 1);
    // Nothing plaintext leaks into the persisted shape
    assert!(!record.encrypted_content.contains("Hello"));
    assert!(!record.encrypted_html_content.contains("Hello"));

    let fields = svc.decrypt_journal_entry(&record).await.unwrap();
    assert_eq!(fields.content, "Hello");
    assert_eq!(fields.html_content.as_deref(), Some("<p>Hello</p>"));
    assert_eq!(fields.prompt.as_deref(), Some("How do you feel?"));
}

#[tokio::test]
async fn absent_optional_fields_use_empty_pairs() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let draft = JournalEntryDraft {
        content: "just words tonight".into(),
        html_content: None,
        prompt: None,
    };

    let record = svc.encrypt_journal_entry(&draft).await.unwrap();
    assert_eq!(record.encrypted_html_content, "");
    assert_eq!(record.html_content_iv, "");
    assert_eq!(record.encrypted_prompt, "");
    assert_eq!(record.prompt_iv, "");
    assert_eq!(record.word_count, 3);

    let fields = svc.decrypt_journal_entry(&record).await.unwrap();
    assert_eq!(fields.content, "just words tonight");
    assert_eq!(fields.html_content, None);
    assert_eq!(fields.prompt, None);
}

#[tokio::test]
async fn persisted_shape_survives_serialization() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    let json = serde_json::to_value(&record).unwrap();
    for key in [
        "encrypted_content",
        "content_iv",
        "encrypted_html_content",
        "html_content_iv",
        "encrypted_prompt",
        "prompt_iv",
        "encrypted_data_key",
        "data_key_iv",
        "word_count",
    ] {
        assert!(json.get(key).is_some(), "missing persisted field {key}");
    }

    let restored: solace_records::EncryptedJournalEntry =
        serde_json::from_value(json).unwrap();
    let fields = svc.decrypt_journal_entry(&restored).await.unwrap();
    assert_eq!(fields.content, "Hello");
}

// ── Lock gating ──

#[tokio::test]
async fn encrypt_fails_while_locked() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    svc.lock_encryption().await;

    let result = svc.encrypt_journal_entry(&sample_entry()).await;
    assert!(matches!(result, Err(RecordError::Locked)));
}

#[tokio::test]
async fn decrypt_fails_while_locked() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    // Lock and attempt the decrypt in the same tick, no awaits in between
    svc.lock_encryption().await;
    let result = svc.decrypt_journal_entry(&record).await;

    assert!(matches!(result, Err(RecordError::Locked)));
}

#[tokio::test]
async fn relock_then_unlock_decrypts_again() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    svc.lock_encryption().await;
    svc.unlock_encryption("hunter22").await.unwrap();

    let fields = svc.decrypt_journal_entry(&record).await.unwrap();
    assert_eq!(fields.content, "Hello");
}

// ── Wrong master key ──

#[tokio::test]
async fn foreign_master_key_cannot_decrypt() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    // Another session unlocked with a different password: its master key
    // must not unwrap this record's data key.
    let other = unlocked_service("user@example.com", "different-password").await;
    let result = other.decrypt_journal_entry(&record).await;

    assert!(matches!(result, Err(RecordError::DecryptionFailed)));
}

// ── All-or-nothing decryption ──

#[tokio::test]
async fn corrupted_field_fails_the_whole_record() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let mut record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    // Corrupt only the prompt; content and html are untouched
    record.encrypted_prompt = flip_first_char(&record.encrypted_prompt);

    let result = svc.decrypt_journal_entry(&record).await;
    assert!(matches!(result, Err(RecordError::DecryptionFailed)));
}

#[tokio::test]
async fn corrupted_wrapped_key_fails_the_whole_record() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let mut record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    record.encrypted_data_key = flip_first_char(&record.encrypted_data_key);

    let result = svc.decrypt_journal_entry(&record).await;
    assert!(matches!(result, Err(RecordError::DecryptionFailed)));
}

#[tokio::test]
async fn corrupted_record_does_not_affect_other_records() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let good = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();
    let mut bad = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();
    bad.content_iv = flip_first_char(&bad.content_iv);

    assert!(svc.decrypt_journal_entry(&bad).await.is_err());
    // The failure is per-record; the good one still decrypts
    let fields = svc.decrypt_journal_entry(&good).await.unwrap();
    assert_eq!(fields.content, "Hello");
}

// ── Goals ──

#[tokio::test]
async fn goal_roundtrip() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let draft = GoalDraft {
        goal: "Meditate every morning".into(),
        description: Some("Ten minutes before breakfast".into()),
    };

    let record = svc.encrypt_goal(&draft).await.unwrap();
    let fields = svc.decrypt_goal(&record).await.unwrap();

    assert_eq!(fields.goal, "Meditate every morning");
    assert_eq!(
        fields.description.as_deref(),
        Some("Ten minutes before breakfast")
    );
}

#[tokio::test]
async fn goal_without_description() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let draft = GoalDraft {
        goal: "Drink more water".into(),
        description: None,
    };

    let record = svc.encrypt_goal(&draft).await.unwrap();
    assert_eq!(record.encrypted_description, "");
    assert_eq!(record.description_iv, "");

    let fields = svc.decrypt_goal(&record).await.unwrap();
    assert_eq!(fields.description, None);
}

#[tokio::test]
async fn back_to_back_goals_share_nothing() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let draft = GoalDraft {
        goal: "Sleep by eleven".into(),
        description: Some("Weeknights at least".into()),
    };

    let a = svc.encrypt_goal(&draft).await.unwrap();
    let b = svc.encrypt_goal(&draft).await.unwrap();

    // One fresh data key per record, one fresh iv per encryption call
    assert_ne!(a.encrypted_data_key, b.encrypted_data_key);
    assert_ne!(a.data_key_iv, b.data_key_iv);
    assert_ne!(a.goal_iv, b.goal_iv);
    assert_ne!(a.description_iv, b.description_iv);
    assert_ne!(a.encrypted_goal, b.encrypted_goal);
}

#[tokio::test]
async fn journal_entry_ivs_are_pairwise_distinct() {
    let svc = unlocked_service("user@example.com", "hunter22").await;
    let record = svc.encrypt_journal_entry(&sample_entry()).await.unwrap();

    let ivs = [
        &record.content_iv,
        &record.html_content_iv,
        &record.prompt_iv,
        &record.data_key_iv,
    ];
    for (i, a) in ivs.iter().enumerate() {
        for b in ivs.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}

fn flip_first_char(s: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}
