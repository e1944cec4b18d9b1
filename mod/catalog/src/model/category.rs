use serde::{Deserialize, Serialize};

/// A catalog category, stored at `categories/{name}`.
///
/// The name is the identifier: renames are unsupported and uniqueness is
/// enforced by conditional insertion. A category can only be deleted
/// while no video references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
}
