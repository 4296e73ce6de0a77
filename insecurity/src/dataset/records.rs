use crate::{
    common::*,
    ground_truth::{PartLocations, NUM_PARTS},
};

/// One test image as listed in the ground-truth file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub image_file: PathBuf,
    pub label: i64,
    pub dataset_index: usize,
}

/// Loads a space separated `path label index` list.
///
/// Relative image paths are resolved against `image_dir`.
pub fn load_ground_truth_list(
    image_dir: impl AsRef<Path>,
    list_file: impl AsRef<Path>,
) -> Result<Vec<GroundTruthRecord>> {
    let image_dir = image_dir.as_ref();
    let list_file = list_file.as_ref();

    let records: Vec<GroundTruthRecord> = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b' ')
        .comment(Some(b'#'))
        .from_path(list_file)
        .with_context(|| format!("failed to open ground truth list '{}'", list_file.display()))?
        .deserialize()
        .try_collect()
        .with_context(|| format!("failed to parse ground truth list '{}'", list_file.display()))?;

    ensure!(
        !records.is_empty(),
        "no records found in '{}'",
        list_file.display()
    );
    let num_indices = records
        .iter()
        .map(|record| record.dataset_index)
        .unique()
        .count();
    ensure!(
        num_indices == records.len(),
        "duplicated dataset indices found in '{}'",
        list_file.display()
    );

    let records = records
        .into_iter()
        .map(|record| GroundTruthRecord {
            image_file: image_dir.join(&record.image_file),
            ..record
        })
        .collect();
    Ok(records)
}

/// Loads the part-location file, keyed by dataset index.
pub fn load_part_locations(path: impl AsRef<Path>) -> Result<HashMap<usize, PartLocations>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read part locations '{}'", path.display()))?;

    let mut table = HashMap::new();
    for (line_index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts = PartLocations::parse_line(line, NUM_PARTS).with_context(|| {
            format!(
                "invalid part locations on line {} of '{}'",
                line_index + 1,
                path.display()
            )
        })?;
        let dataset_index = parts.dataset_index;
        ensure!(
            table.insert(dataset_index, parts).is_none(),
            "dataset index {} is listed twice in '{}'",
            dataset_index,
            path.display()
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_truth_list_test() -> Result<()> {
        let base_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data");
        let records = load_ground_truth_list(base_dir.join("images"), base_dir.join("gt.txt"))?;

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].image_file,
            base_dir.join("images").join("001.Black_footed_Albatross/img_0001.jpg")
        );
        assert_eq!(records[0].label, 0);
        assert_eq!(records[2].dataset_index, 5793);
        Ok(())
    }

    #[test]
    fn part_locations_test() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("data")
            .join("part_locs.txt");
        let table = load_part_locations(path)?;

        assert_eq!(table.len(), 3);
        let parts = &table[&12];
        assert_eq!(parts.points.len(), NUM_PARTS);
        assert!(parts.points[1].is_origin());
        assert_eq!(parts.points[0].x(), 100.0);
        Ok(())
    }
}
