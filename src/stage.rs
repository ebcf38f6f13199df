//! Staged interchange files.
//!
//! Fragments are written as CSV with the fixed header
//! `courierName,vehicleType,firstName,lastName,gender,age,createdAt,updatedAt`.
//! An empty `age` field means null; timestamps are ISO-8601 text.

use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::NodeRegistry;
use crate::error::{
    CreateStagingDirSnafu, FlushFragmentSnafu, FragmentMissingSnafu, OpenFragmentSnafu,
    ReadFragmentSnafu, StageError, WriteFragmentSnafu,
};
use crate::model::Rider;
use crate::partition::Partitions;

/// Staged file path for a node: the first node holds the full set, the
/// rest hold fragments.
pub fn fragment_path(dir: &Path, index: usize, node: &str) -> PathBuf {
    let suffix = if index == 0 { "full" } else { "fragment" };
    dir.join(format!("{node}_{suffix}.csv"))
}

/// Column names of the interchange format, in wire order.
const HEADER: [&str; 8] = [
    "courierName",
    "vehicleType",
    "firstName",
    "lastName",
    "gender",
    "age",
    "createdAt",
    "updatedAt",
];

/// Serialize one fragment to a CSV file, returning the row count written.
///
/// The header is written explicitly so a zero-row fragment still carries
/// it; an empty group is a normal outcome of the pivot split.
pub fn write_fragment(riders: &[Rider], path: &Path) -> Result<usize, StageError> {
    let path_text = path.display().to_string();

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(OpenFragmentSnafu {
            path: path_text.clone(),
        })?;

    writer.write_record(HEADER).context(WriteFragmentSnafu {
        path: path_text.clone(),
    })?;
    for rider in riders {
        writer.serialize(rider).context(WriteFragmentSnafu {
            path: path_text.clone(),
        })?;
    }
    writer.flush().context(FlushFragmentSnafu { path: path_text })?;

    Ok(riders.len())
}

/// Read a staged fragment back into rider records.
///
/// A missing file is fatal; empty optional fields deserialize to `None`.
pub fn read_fragment(path: &Path) -> Result<Vec<Rider>, StageError> {
    let path_text = path.display().to_string();
    ensure!(
        path.exists(),
        FragmentMissingSnafu {
            path: path_text.clone()
        }
    );

    let mut reader = csv::Reader::from_path(path).context(OpenFragmentSnafu {
        path: path_text.clone(),
    })?;

    let mut riders = Vec::new();
    for row in reader.deserialize() {
        riders.push(row.context(ReadFragmentSnafu {
            path: path_text.clone(),
        })?);
    }
    Ok(riders)
}

/// Stage all three partitions under the given directory, one file per
/// registered node, in registry order. Returns the written paths.
///
/// Expects a three-node registry; the pipeline rejects any other fan-out
/// before staging starts.
pub fn stage_partitions(
    partitions: &Partitions,
    dir: &Path,
    registry: &NodeRegistry,
) -> Result<Vec<PathBuf>, StageError> {
    debug_assert_eq!(
        registry.node_names().len(),
        3,
        "stage_partitions expects a three-node registry"
    );

    fs::create_dir_all(dir).context(CreateStagingDirSnafu {
        path: dir.display().to_string(),
    })?;

    let fragments = [&partitions.full, &partitions.group_a, &partitions.group_b];
    let mut paths = Vec::new();

    for (index, (node, rows)) in registry.node_names().iter().zip(fragments).enumerate() {
        let path = fragment_path(dir, index, node);
        let count = write_fragment(rows, &path)?;
        info!("Staged {count} rows to {}", path.display());
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CourierName;
    use crate::partition::partition;
    use tempfile::TempDir;

    fn rider(courier: &str, age: Option<u32>) -> Rider {
        Rider {
            courier_name: courier.to_string(),
            vehicle_type: "Bicycle".to_string(),
            first_name: "Lena".to_string(),
            last_name: "Ortiz".to_string(),
            gender: Some("Female".to_string()),
            age,
            created_at: crate::transform::parse_timestamp("2023-01-01"),
            updated_at: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fragment.csv");
        let riders = vec![rider("JNT", Some(25)), rider("LBCD", None)];

        let written = write_fragment(&riders, &path).unwrap();
        assert_eq!(written, 2);

        let restored = read_fragment(&path).unwrap();
        assert_eq!(restored, riders);
    }

    #[test]
    fn test_header_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fragment.csv");
        write_fragment(&[rider("JNT", None)], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "courierName,vehicleType,firstName,lastName,gender,age,createdAt,updatedAt"
        );
    }

    #[test]
    fn test_empty_age_round_trips_to_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fragment.csv");
        write_fragment(&[rider("JNT", None)], &path).unwrap();

        let restored = read_fragment(&path).unwrap();
        assert_eq!(restored[0].age, None);
        assert_eq!(restored[0].updated_at, None);
    }

    #[test]
    fn test_empty_fragment_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fragment.csv");

        let written = write_fragment(&[], &path).unwrap();
        assert_eq!(written, 0);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "courierName,vehicleType,firstName,lastName,gender,age,createdAt,updatedAt"
        );
        assert_eq!(read_fragment(&path).unwrap(), Vec::<Rider>::new());
    }

    #[test]
    #[should_panic(expected = "three-node registry")]
    fn test_stage_partitions_requires_three_nodes() {
        let dir = TempDir::new().unwrap();
        let registry = NodeRegistry::new(vec!["solo".to_string()]);
        let partitions = partition(vec![rider("JNT", None)], CourierName::Jnt);
        let _ = stage_partitions(&partitions, dir.path(), &registry);
    }

    #[test]
    fn test_missing_fragment_is_fatal() {
        let result = read_fragment(Path::new("/nonexistent/fragment.csv"));
        assert!(matches!(result, Err(StageError::FragmentMissing { .. })));
    }

    #[test]
    fn test_stage_partitions_names_files_by_node() {
        let dir = TempDir::new().unwrap();
        let registry = NodeRegistry::default();
        let riders = vec![rider("JNT", Some(20)), rider("FEDEZ", Some(40))];
        let partitions = partition(riders, CourierName::Jnt);

        let paths = stage_partitions(&partitions, dir.path(), &registry).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("node1_full.csv"));
        assert!(paths[1].ends_with("node2_fragment.csv"));
        assert!(paths[2].ends_with("node3_fragment.csv"));

        assert_eq!(read_fragment(&paths[0]).unwrap().len(), 2);
        assert_eq!(read_fragment(&paths[1]).unwrap().len(), 1);
        assert_eq!(read_fragment(&paths[2]).unwrap().len(), 1);
    }
}
