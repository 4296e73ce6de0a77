use crate::{common::*, config::DatasetConfig};
use insecurity::{
    dataset::{self, GroundTruthRecord},
    ground_truth::{CommonAttributeTable, PartLocations, NUM_PARTS},
};

/// Test records with their part annotations and the shared-attribute table.
#[derive(Debug, Clone)]
pub struct EvalDataset {
    pub records: Vec<GroundTruthRecord>,
    pub parts: HashMap<usize, PartLocations>,
    pub table: CommonAttributeTable,
}

impl EvalDataset {
    pub fn load(config: &DatasetConfig) -> Result<Self> {
        let DatasetConfig {
            image_dir,
            ground_truth_file,
            part_locations_file,
            attribute_table_file,
            ..
        } = config;

        let records = dataset::load_ground_truth_list(image_dir, ground_truth_file)?;
        let parts = dataset::load_part_locations(part_locations_file)?;
        let table = CommonAttributeTable::open(attribute_table_file)?;

        if let Some(max_attribute) = table.max_attribute() {
            ensure!(
                max_attribute < NUM_PARTS,
                "attribute index {} in '{}' is out of range for {} parts",
                max_attribute,
                attribute_table_file.display(),
                NUM_PARTS
            );
        }

        let num_annotated = records
            .iter()
            .filter(|record| parts.contains_key(&record.dataset_index))
            .count();
        if num_annotated < records.len() {
            warn!(
                "{} of {} test images have no part annotations",
                records.len() - num_annotated,
                records.len()
            );
        }

        info!(
            "loaded {} test images and {} class pairs",
            records.len(),
            table.len()
        );

        Ok(Self {
            records,
            parts,
            table,
        })
    }

    /// Part annotations of an image. An image without a part-location line
    /// has every part missing, so all of its pairs end up without effect.
    pub fn parts(&self, dataset_index: usize) -> PartLocations {
        self.parts.get(&dataset_index).cloned().unwrap_or_else(|| {
            debug!("image {} has no part annotations", dataset_index);
            PartLocations::unannotated(dataset_index, NUM_PARTS)
        })
    }
}
