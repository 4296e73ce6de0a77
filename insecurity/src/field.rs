use crate::{
    attribution::{ClassSaliency, SaliencyMap},
    common::*,
    confusion::ClassPair,
};

/// Fill value for negative class saliency before maps are multiplied.
pub const SALIENCY_EPSILON: f32 = 1e-7;

/// Joint insecurity of a class pair on the canonical grid.
#[derive(Debug, Clone, PartialEq)]
pub struct InsecurityField {
    values: Array2<f32>,
}

impl InsecurityField {
    pub fn new(values: Array2<f32>) -> Result<Self> {
        ensure!(
            values.dim() == (CANONICAL_SIZE, CANONICAL_SIZE),
            "an insecurity field must be {}x{}, but get {:?}",
            CANONICAL_SIZE,
            CANONICAL_SIZE,
            values.dim()
        );
        Ok(Self { values })
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }
}

/// Multiplies the maps of a class pair with the difficulty map and resizes
/// the product onto the canonical grid.
#[derive(Debug, Clone)]
pub struct InsecurityFieldBuilder {
    size: CanonicalSize<usize>,
}

impl Default for InsecurityFieldBuilder {
    fn default() -> Self {
        Self {
            size: CanonicalSize::canonical(),
        }
    }
}

impl InsecurityFieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        &self,
        classes: &ClassSaliency,
        difficulty: &SaliencyMap,
        pair: ClassPair,
    ) -> Result<InsecurityField> {
        ensure!(
            classes.dim() == difficulty.dim(),
            "class maps of size {:?} and difficulty map of size {:?} differ",
            classes.dim(),
            difficulty.dim()
        );
        ensure!(
            pair.second() < classes.num_candidates(),
            "pair {} is out of range for {} candidates",
            pair,
            classes.num_candidates()
        );

        let product =
            &classes.map(pair.first()) * &classes.map(pair.second()) * difficulty.values();
        let [h, w] = self.size.hw();
        let resized = Tensor::f_from_array2(&product)?
            .f_resize2d_bilinear(h as i64, w as i64)?
            .f_to_array2()?;

        InsecurityField::new(resized)
    }
}
