pub use anyhow::{bail, ensure, format_err, Context as _, Error, Result};
pub use canonical_frame::{
    CanonicalSize, GridPoint, RawPoint, RawSize, Rescale, CANONICAL_AREA, CANONICAL_SIZE,
};
pub use derivative::Derivative;
pub use indexmap::IndexMap;
pub use itertools::{izip, Itertools as _};
pub use log::{debug, info};
pub use ndarray::{s, Array2, Array3, ArrayView2, Axis};
pub use noisy_float::prelude::*;
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
pub use std::{
    borrow::Borrow,
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    convert::{TryFrom, TryInto},
    fmt::{self, Display, Formatter},
    fs,
    path::{Path, PathBuf},
};
pub use strum::AsRefStr;
pub use tch::{nn, Device, Kind, Tensor};
pub use tch_goodies::TensorExt as _;
