//! Property-based tests for the wire types.
//!
//! Uses proptest to verify:
//! 1. Title validation accepts exactly the trimmed 1-200 character range.
//! 2. Any `Task` survives a JSON round-trip.
//! 3. Drafts built from raw input never carry empty descriptions.
//! 4. Error envelopes round-trip, and unknown codes decode gracefully.

use proptest::prelude::*;
use termtask_proto::error::{ErrorCode, ErrorEnvelope};
use termtask_proto::task::{MAX_TITLE_LENGTH, NewTask, Task, TaskId, validate_title};
use uuid::Uuid;

// --- Strategies ---

/// Strategy for arbitrary `TaskId` values.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for titles that must validate: 1-200 chars, no surrounding
/// whitespace trimmed away below the minimum.
fn arb_valid_title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,198}".prop_map(|middle| format!("x{middle}x"))
}

/// Strategy for arbitrary optional descriptions.
fn arb_description() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[^\x00]{1,64}")
}

/// Strategy for arbitrary `Task` values with fixed-precision timestamps
/// (JSON round-trips are exact at whole-second precision).
fn arb_task() -> impl Strategy<Value = Task> {
    (
        arb_task_id(),
        arb_valid_title(),
        arb_description(),
        any::<bool>(),
        0i64..=4_102_444_800i64,
    )
        .prop_map(|(id, title, description, is_completed, secs)| {
            let stamp = chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default();
            Task {
                id,
                title,
                description,
                is_completed,
                created_at: stamp,
                updated_at: stamp,
            }
        })
}

/// Strategy over the known error codes.
fn arb_error_code() -> impl Strategy<Value = ErrorCode> {
    prop_oneof![
        Just(ErrorCode::Unauthorized),
        Just(ErrorCode::Validation),
        Just(ErrorCode::NotFound),
        Just(ErrorCode::Forbidden),
        Just(ErrorCode::Conflict),
        Just(ErrorCode::Unknown),
    ]
}

// --- Properties ---

proptest! {
    #[test]
    fn title_validation_accepts_exactly_the_trimmed_range(raw in "[ ]{0,3}[a-zA-Z0-9 ]{0,260}[ ]{0,3}") {
        let trimmed_len = raw.trim().chars().count();
        let result = validate_title(&raw);
        if trimmed_len == 0 || trimmed_len > MAX_TITLE_LENGTH {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(result.unwrap(), raw.trim());
        }
    }

    #[test]
    fn task_json_round_trip(task in arb_task()) {
        let json = serde_json::to_string(&task).unwrap();
        let decoded: Task = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(task, decoded);
    }

    #[test]
    fn draft_description_is_never_empty(title in arb_valid_title(), description in prop::option::of("[ ]{0,5}[a-z ]{0,20}")) {
        let draft = NewTask::from_input(&title, description.as_deref()).unwrap();
        if let Some(d) = draft.description {
            prop_assert!(!d.trim().is_empty());
            prop_assert_eq!(d.trim().to_string(), d);
        }
    }

    #[test]
    fn error_envelope_round_trip(code in arb_error_code(), message in "[^\x00]{0,128}") {
        let envelope = ErrorEnvelope::new(code, message);
        let json = serde_json::to_string(&envelope).unwrap();
        let decoded: ErrorEnvelope = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(envelope, decoded);
    }

    #[test]
    fn unrecognized_codes_decode_to_unknown(code in "[A-Z_]{1,24}") {
        prop_assume!(!matches!(
            code.as_str(),
            "UNAUTHORIZED" | "VALIDATION" | "NOT_FOUND" | "FORBIDDEN" | "CONFLICT" | "UNKNOWN"
        ));
        let json = format!("\"{code}\"");
        let decoded: ErrorCode = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, ErrorCode::Unknown);
    }

    #[test]
    fn garbage_bytes_never_panic_the_task_decoder(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        // Err is fine; panicking is not.
        let _ = serde_json::from_slice::<Task>(&bytes);
    }
}
