//! Domains and switch-wide default settings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A switch domain. Its name is both the dialplan context and the SIP host
/// part used when ringing local extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
  pub id:   Uuid,
  pub name: String,
}

/// A switch-wide setting, looked up by `(category, subcategory)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSetting {
  pub category:    String,
  pub subcategory: String,
  pub value:       String,
}
