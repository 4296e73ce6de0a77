pub use anyhow::{ensure, Context as _, Result};
pub use chrono::Local;
pub use log::{debug, info, warn};
pub use once_cell::sync::Lazy;
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize};
pub use std::{
    collections::HashMap,
    fs,
    io::Write as _,
    path::{Path, PathBuf},
};
pub use tch::Device;
