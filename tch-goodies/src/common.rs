pub use anyhow::{bail, ensure, Result};
pub use itertools::Itertools;
pub use ndarray::Array2;
pub use tch::{Device, Kind, Tensor};
