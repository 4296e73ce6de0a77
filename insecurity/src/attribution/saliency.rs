use crate::common::*;

/// Single-channel attribution map at the probed layer's resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    values: Array2<f32>,
}

impl SaliencyMap {
    pub fn new(values: Array2<f32>) -> Result<Self> {
        let (h, w) = values.dim();
        ensure!(h > 0 && w > 0, "a saliency map must not be empty");
        Ok(Self { values })
    }

    /// Weights the activation by the ReLU-clipped gradient and sums over
    /// channels.
    ///
    /// Both tensors have shape `[1, C, H, W]`.
    pub fn from_activation_gradient(activation: &Tensor, gradient: &Tensor) -> Result<Self> {
        let shape = activation.size();
        ensure!(
            shape == gradient.size(),
            "activation shape {:?} does not match gradient shape {:?}",
            shape,
            gradient.size()
        );
        match *shape.as_slice() {
            [1, _c, _h, _w] => (),
            _ => bail!(
                "expect activation of shape [1, C, H, W], but get {:?}",
                shape
            ),
        }

        let weights = gradient.f_clamp_min(0.0)?;
        let map = (activation.detach() * weights)
            .f_sum_dim_intlist(&[1], false, Kind::Float)?
            .f_squeeze_dim(0)?;
        Self::new(map.f_to_array2()?)
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f32> {
        self.values
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }
}

/// Per-candidate class maps stacked along the last axis, shape `(H, W, K)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSaliency {
    maps: Array3<f32>,
    candidates: Vec<i64>,
}

impl ClassSaliency {
    pub fn new(maps: Array3<f32>, candidates: Vec<i64>) -> Result<Self> {
        let (h, w, k) = maps.dim();
        ensure!(h > 0 && w > 0, "class saliency maps must not be empty");
        ensure!(
            k == candidates.len(),
            "expect {} class maps, but get {}",
            candidates.len(),
            k
        );
        Ok(Self { maps, candidates })
    }

    pub fn from_maps(maps: &[SaliencyMap], candidates: Vec<i64>) -> Result<Self> {
        ensure!(!maps.is_empty(), "at least one class map is required");
        let views: Vec<_> = maps.iter().map(|map| map.values().view()).collect();
        let stacked = ndarray::stack(Axis(2), &views)?;
        Self::new(stacked, candidates)
    }

    /// Replaces negative entries by `epsilon`.
    pub fn clip_negative(mut self, epsilon: f32) -> Self {
        self.maps
            .mapv_inplace(|value| if value < 0.0 { epsilon } else { value });
        self
    }

    pub fn maps(&self) -> &Array3<f32> {
        &self.maps
    }

    pub fn map(&self, slot: usize) -> ArrayView2<'_, f32> {
        self.maps.index_axis(Axis(2), slot)
    }

    pub fn candidates(&self) -> &[i64] {
        &self.candidates
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Spatial resolution `(H, W)`.
    pub fn dim(&self) -> (usize, usize) {
        let (h, w, _) = self.maps.dim();
        (h, w)
    }
}
