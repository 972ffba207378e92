pub mod check;
pub mod layout;
pub mod serialize;

pub use check::{check, CheckArgs};
pub use layout::{layout, LayoutArgs};
pub use serialize::{serialize, SerializeArgs};

use anyhow::{anyhow, Result};
use std::path::Path;

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))
}
