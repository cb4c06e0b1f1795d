use crate::catalog::Catalog;
use crate::error::Result;

/// Supplies the full set of documents for one index build.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Catalog>;
}
