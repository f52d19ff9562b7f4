//! Unit tests for the Identifiers module

use core_kernel::{RatingId, SnapshotId};
use uuid::Uuid;

mod rating_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = RatingId::new();
        let id2 = RatingId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = RatingId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = RatingId::new_v7();
        let uuid1: Uuid = id1.into();
        let uuid2: Uuid = id2.into();
        assert!(uuid1 < uuid2);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(RatingId::prefix(), "RTG");
        assert_eq!(SnapshotId::prefix(), "TBL");
    }

    #[test]
    fn test_parse_accepts_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: RatingId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("RTG-not-a-uuid".parse::<RatingId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = SnapshotId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
