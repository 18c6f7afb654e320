// Starter template catalog - static code snippets the editor can insert

use serde::{Deserialize, Serialize};

/// One starter template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub description: String,
    pub code: String,
}

impl Template {
    pub fn new(name: &str, description: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            code: code.to_string(),
        }
    }
}

/// Catalog of templates offered by the starter picker.
pub trait TemplateCatalog {
    fn templates(&self) -> &[Template];
}
