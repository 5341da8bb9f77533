//! Unit tests for the Identifiers module
//!
//! Tests cover creation, parsing, conversion, and display formatting
//! for book, member, and loan identifiers.

use core_kernel::{BookId, LoanId, MemberId};
use uuid::Uuid;

mod book_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = BookId::new();
        let id2 = BookId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = BookId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = BookId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(BookId::prefix(), "BK");
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = BookId::new();
        let parsed: BookId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: BookId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("BK-not-a-uuid".parse::<BookId>().is_err());
    }
}

mod member_id_tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let id = MemberId::new();
        assert!(id.to_string().starts_with("MBR-"));
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id: MemberId = uuid.into();
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }
}

mod loan_id_tests {
    use super::*;

    #[test]
    fn test_display_format() {
        assert!(LoanId::new().to_string().starts_with("LN-"));
    }

    #[test]
    fn test_json_is_bare_uuid() {
        let id = LoanId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: LoanId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_default_is_v7() {
        let id = LoanId::default();
        assert_eq!(id.as_uuid().get_version_num(), 7);
    }
}

mod parsing_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prefixed_and_bare_forms_name_the_same_book(bytes in any::<[u8; 16]>()) {
            let uuid = Uuid::from_bytes(bytes);
            let bare: BookId = uuid.to_string().parse().unwrap();
            let prefixed: BookId = format!("BK-{}", uuid).parse().unwrap();
            prop_assert_eq!(bare, prefixed);
            prop_assert_eq!(*bare.as_uuid(), uuid);
        }
    }
}
