//! Integration tests for riderfrag

use riderfrag::config::NodeRegistry;
use riderfrag::model::{CourierName, RawRider};
use riderfrag::partition::partition;
use riderfrag::{stage, transform};
use tempfile::TempDir;

fn raw_rider(courier: &str, vehicle: &str, first_name: &str) -> RawRider {
    RawRider {
        courier_name: courier.to_string(),
        vehicle_type: vehicle.to_string(),
        first_name: first_name.to_string(),
        last_name: "Santos".to_string(),
        gender: Some("f".to_string()),
        age: Some(28),
        created_at: Some("2023-03-15 08:00:00".to_string()),
        updated_at: Some("not-a-timestamp".to_string()),
    }
}

mod transform_tests {
    use super::*;

    #[test]
    fn test_normalize_then_validate_clean_batch() {
        let raw = vec![
            raw_rider("JNT", "motorbike", "a"),
            raw_rider("LBCD", "bike", "b"),
            raw_rider("FEDEZ", "Car", "c"),
        ];

        let riders = transform::normalize(raw);
        transform::validate(&riders).expect("normalized batch should validate");

        assert_eq!(riders[0].vehicle_type, "Motorcycle");
        assert_eq!(riders[1].vehicle_type, "Bicycle");
        assert_eq!(riders[0].gender.as_deref(), Some("Female"));
        assert!(riders[0].created_at.is_some());
        // Malformed timestamps soft-fail to null, never an error.
        assert!(riders[0].updated_at.is_none());
    }

    #[test]
    fn test_validation_is_batch_level() {
        let raw = vec![
            raw_rider("JNT", "Motorcycle", "a"),
            raw_rider("GRAB", "Motorcycle", "b"),
        ];
        let riders = transform::normalize(raw);

        // One bad row rejects the entire batch.
        assert!(transform::validate(&riders).is_err());
    }
}

mod pipeline_stage_tests {
    use super::*;

    #[test]
    fn test_normalize_partition_stage_end_to_end() {
        let mut raw = Vec::new();
        for i in 0..4 {
            raw.push(raw_rider("JNT", "motorbike", &format!("jnt{i}")));
        }
        for i in 0..6 {
            let courier = if i % 2 == 0 { "LBCD" } else { "FEDEZ" };
            raw.push(raw_rider(courier, "trike", &format!("other{i}")));
        }

        let riders = transform::normalize(raw);
        transform::validate(&riders).unwrap();

        let partitions = partition(riders, CourierName::Jnt);
        assert_eq!(partitions.full.len(), 10);
        assert_eq!(partitions.group_a.len(), 4);
        assert_eq!(partitions.group_b.len(), 6);

        let dir = TempDir::new().unwrap();
        let registry = NodeRegistry::default();
        let paths = stage::stage_partitions(&partitions, dir.path(), &registry).unwrap();

        // Staged files round-trip exactly, fragment by fragment.
        assert_eq!(stage::read_fragment(&paths[0]).unwrap(), partitions.full);
        assert_eq!(stage::read_fragment(&paths[1]).unwrap(), partitions.group_a);
        assert_eq!(stage::read_fragment(&paths[2]).unwrap(), partitions.group_b);
    }

    #[test]
    fn test_staged_file_interchange_header() {
        let riders = transform::normalize(vec![raw_rider("JNT", "Car", "solo")]);
        let partitions = partition(riders, CourierName::Jnt);

        let dir = TempDir::new().unwrap();
        let registry = NodeRegistry::default();
        let paths = stage::stage_partitions(&partitions, dir.path(), &registry).unwrap();

        for path in &paths {
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.starts_with(
                "courierName,vehicleType,firstName,lastName,gender,age,createdAt,updatedAt"
            ));
        }
    }
}
