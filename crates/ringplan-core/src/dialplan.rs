//! The routing-program ("dialplan") record a ring group compiles into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use crate::{domain::Domain, ring_group::RingGroup};

/// Application identity stamped on every ring-group dialplan.
pub const RING_GROUP_APP_ID: Uuid = uuid!("77578687-8eb7-4bb7-a00a-ddf3e8b7169f");

pub const RING_GROUP_CATEGORY: &str = "Ring group";

/// Ring-group dialplans run after the domain's core routing.
pub const RING_GROUP_SEQUENCE: i32 = 101;

/// A stored dialplan. The `xml` body is always a full rendering; it is
/// replaced wholesale on each compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialplan {
  pub id:          Uuid,
  pub domain_id:   Uuid,
  pub app_id:      Uuid,
  pub name:        String,
  pub number:      String,
  /// Whether this dialplan is an inbound destination. Always `false` for
  /// ring groups.
  pub destination: bool,
  pub context:     String,
  pub category:    String,
  pub dp_continue: bool,
  pub sequence:    i32,
  pub enabled:     bool,
  pub description: Option<String>,
  pub xml:         String,
  pub updated_by:  String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input for creating a dialplan; the store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewDialplan {
  pub domain_id:   Uuid,
  pub app_id:      Uuid,
  pub name:        String,
  pub number:      String,
  pub destination: bool,
  pub context:     String,
  pub category:    String,
  pub dp_continue: bool,
  pub sequence:    i32,
  pub enabled:     bool,
  pub description: Option<String>,
  pub updated_by:  String,
}

impl NewDialplan {
  /// The fixed-metadata dialplan backing `ring_group` in `domain`.
  pub fn for_ring_group(
    ring_group: &RingGroup,
    domain: &Domain,
    updated_by: &str,
  ) -> Self {
    NewDialplan {
      domain_id:   ring_group.domain_id,
      app_id:      RING_GROUP_APP_ID,
      name:        ring_group.name.clone(),
      number:      ring_group.extension.clone(),
      destination: false,
      context:     domain.name.clone(),
      category:    RING_GROUP_CATEGORY.to_owned(),
      dp_continue: false,
      sequence:    RING_GROUP_SEQUENCE,
      enabled:     ring_group.enabled,
      description: ring_group.description.clone(),
      updated_by:  updated_by.to_owned(),
    }
  }
}
