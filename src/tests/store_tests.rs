use super::*;
use crate::config::DEFAULT_TYPING_DELAY_MS;
use crate::error::ReplayError;
use crate::message::{MessageRaw, ParticipantRaw};
use crate::policy::ScriptPolicy;
use crate::resource::ResourceLimiter;

fn participant(id: &str, name: &str, is_self: bool) -> ParticipantRaw {
    ParticipantRaw {
        id: id.to_string(),
        name: name.to_string(),
        is_self,
    }
}

fn message(sender_id: &str, text: &str, delay: Option<i64>) -> MessageRaw {
    MessageRaw {
        sender_id: sender_id.to_string(),
        text: text.to_string(),
        typing_delay_ms_override: delay,
    }
}

fn load(script: ScriptRaw) -> Result<ScriptStore, ReplayError> {
    ScriptStore::load(script, &ScriptPolicy::default(), ResourceLimiter::default())
}

#[test]
fn typing_delay_resolves_through_three_tiers() {
    let participants = vec![participant("A", "Alice", false)];
    let messages = vec![message("A", "override", Some(750)), message("A", "inherit", None)];

    let with_default = load(
        ScriptRaw::new("t", participants.clone(), messages.clone()).with_default_typing_delay(1200),
    )
    .unwrap();
    assert_eq!(
        with_default.typing_delay_ms(&with_default.messages()[0], DEFAULT_TYPING_DELAY_MS),
        750
    );
    assert_eq!(
        with_default.typing_delay_ms(&with_default.messages()[1], DEFAULT_TYPING_DELAY_MS),
        1200
    );

    let without_default = load(ScriptRaw::new("t", participants, messages)).unwrap();
    assert_eq!(
        without_default.typing_delay_ms(&without_default.messages()[0], DEFAULT_TYPING_DELAY_MS),
        750
    );
    assert_eq!(
        without_default.typing_delay_ms(&without_default.messages()[1], DEFAULT_TYPING_DELAY_MS),
        2000
    );
}

#[test]
fn find_participant_by_id() {
    let store = load(ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false), participant("B", "Bob", true)],
        vec![message("B", "hey", None)],
    ))
    .unwrap();
    assert_eq!(store.find_participant("A").unwrap().name.as_ref(), "Alice");
    assert!(store.find_participant("B").unwrap().is_self);
    assert!(store.find_participant("C").is_none());
    assert_eq!(store.sender_of(0).unwrap().id.as_ref(), "B");
    assert!(store.sender_of(1).is_none());
}

#[test]
fn dangling_sender_is_rejected_at_load() {
    let err = load(ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false)],
        vec![message("A", "hi", None), message("Z", "who?", None)],
    ))
    .expect_err("dangling sender");
    match err {
        ReplayError::UnknownSender { index, sender_id } => {
            assert_eq!(index, 1);
            assert_eq!(sender_id, "Z");
        }
        other => panic!("expected unknown sender, got {other:?}"),
    }
}

#[test]
fn duplicate_participant_id_is_rejected() {
    let err = load(ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false), participant("A", "Ann", false)],
        vec![],
    ))
    .expect_err("duplicate id");
    assert!(matches!(err, ReplayError::InvalidScript(message) if message.contains("duplicate")));
}

#[test]
fn negative_delay_is_rejected_unless_clamped() {
    let script = ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false)],
        vec![message("A", "hi", Some(-5))],
    );
    let err = load(script.clone()).expect_err("negative delay");
    assert!(matches!(err, ReplayError::InvalidDelay { value: -5, .. }));

    let policy = ScriptPolicy {
        clamp_negative_delays: true,
        ..ScriptPolicy::default()
    };
    let store = ScriptStore::load(script, &policy, ResourceLimiter::default()).unwrap();
    assert_eq!(store.messages()[0].typing_delay_ms, Some(0));
}

#[test]
fn negative_default_delay_is_rejected() {
    let script = ScriptRaw::new("t", vec![participant("A", "Alice", false)], vec![])
        .with_default_typing_delay(-1);
    let err = load(script).expect_err("negative default");
    assert!(matches!(err, ReplayError::InvalidDelay { ref field, .. } if field == "defaultTypingDelayMs"));
}

#[test]
fn empty_text_loads_unless_policy_rejects_it() {
    let script = ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false)],
        vec![message("A", "", None), message("A", "   ", None)],
    );
    let store = load(script.clone()).unwrap();
    assert_eq!(&*store.messages()[0].text, "");

    let policy = ScriptPolicy {
        reject_empty_text: true,
        ..ScriptPolicy::default()
    };
    assert!(matches!(
        ScriptStore::load(script, &policy, ResourceLimiter::default()),
        Err(ReplayError::InvalidScript(_))
    ));
}

#[test]
fn message_count_limit_is_enforced() {
    let limits = ResourceLimiter {
        max_messages: 1,
        ..ResourceLimiter::default()
    };
    let script = ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false)],
        vec![message("A", "one", None), message("A", "two", None)],
    );
    let err = ScriptStore::load(script, &ScriptPolicy::default(), limits).expect_err("limit");
    assert!(matches!(err, ReplayError::ResourceLimit(_)));
}

#[test]
fn repeated_strings_are_interned() {
    let store = load(ScriptRaw::new(
        "t",
        vec![participant("A", "Alice", false)],
        vec![message("A", "same", None), message("A", "same", None)],
    ))
    .unwrap();
    let messages = store.messages();
    assert!(std::sync::Arc::ptr_eq(&messages[0].text, &messages[1].text));
    assert!(std::sync::Arc::ptr_eq(
        &messages[0].sender_id,
        &store.participants()[0].id
    ));
}

#[test]
fn json_schema_names_script_fields() {
    let schema = script_json_schema().unwrap();
    assert!(schema.contains("chatTitle"));
    assert!(schema.contains("typingDelayMsOverride"));
    assert!(schema.contains("isSelf"));
}
