pub use anyhow::{ensure, Error, Result};
pub use num_traits::Num;
pub use serde::{Deserialize, Serialize};
pub use std::{
    convert::{TryFrom, TryInto},
    marker::PhantomData,
};
