//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Booleans and counts use SQLite integers
//! directly.

use chrono::{DateTime, Utc};
use ringplan_core::{
  dialplan::Dialplan,
  domain::Domain,
  extension::{Extension, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `domains` row.
pub struct RawDomain {
  pub domain_id: String,
  pub name:      String,
}

impl RawDomain {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawDomain {
      domain_id: row.get(0)?,
      name:      row.get(1)?,
    })
  }

  pub fn into_domain(self) -> Result<Domain> {
    Ok(Domain {
      id:   decode_uuid(&self.domain_id)?,
      name: self.name,
    })
  }
}

pub const EXTENSION_COLUMNS: &str =
  "extension_id, domain_id, extension, enabled, follow_me_enabled";

/// Raw values read directly from an `extensions` row.
pub struct RawExtension {
  pub extension_id:      String,
  pub domain_id:         String,
  pub extension:         String,
  pub enabled:           bool,
  pub follow_me_enabled: bool,
}

impl RawExtension {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawExtension {
      extension_id:      row.get(0)?,
      domain_id:         row.get(1)?,
      extension:         row.get(2)?,
      enabled:           row.get(3)?,
      follow_me_enabled: row.get(4)?,
    })
  }

  pub fn into_extension(self) -> Result<Extension> {
    Ok(Extension {
      id:                decode_uuid(&self.extension_id)?,
      domain_id:         decode_uuid(&self.domain_id)?,
      extension:         self.extension,
      enabled:           self.enabled,
      follow_me_enabled: self.follow_me_enabled,
    })
  }
}

pub const FOLLOW_ME_COLUMNS: &str =
  "follow_me_id, extension_id, destination, sequence, timeout, delay, prompt";

/// Raw values read directly from a `follow_me_destinations` row.
pub struct RawFollowMe {
  pub follow_me_id: String,
  pub extension_id: String,
  pub destination:  String,
  pub sequence:     i32,
  pub timeout:      u32,
  pub delay:        u32,
  pub prompt:       bool,
}

impl RawFollowMe {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawFollowMe {
      follow_me_id: row.get(0)?,
      extension_id: row.get(1)?,
      destination:  row.get(2)?,
      sequence:     row.get(3)?,
      timeout:      row.get(4)?,
      delay:        row.get(5)?,
      prompt:       row.get(6)?,
    })
  }

  pub fn into_follow_me(self) -> Result<FollowMeDestination> {
    Ok(FollowMeDestination {
      id:           decode_uuid(&self.follow_me_id)?,
      extension_id: decode_uuid(&self.extension_id)?,
      destination:  self.destination,
      sequence:     self.sequence,
      timeout:      self.timeout,
      delay:        self.delay,
      prompt:       self.prompt,
    })
  }
}

pub const RING_GROUP_COLUMNS: &str = "
  ring_group_id, domain_id, name, extension, description, enabled, strategy,
  ringback, caller_id_name, caller_id_number, cid_name_prefix,
  cid_number_prefix, distinctive_ring, missed_call_app, missed_call_data,
  call_timeout, timeout_data, forward_enabled, forward_destination,
  forward_toll_allow, follow_me_enabled, greeting, dialplan_id";

/// Raw values read directly from a `ring_groups` row.
pub struct RawRingGroup {
  pub ring_group_id:       String,
  pub domain_id:           String,
  pub name:                String,
  pub extension:           String,
  pub description:         Option<String>,
  pub enabled:             bool,
  pub strategy:            String,
  pub ringback:            String,
  pub caller_id_name:      Option<String>,
  pub caller_id_number:    Option<String>,
  pub cid_name_prefix:     Option<String>,
  pub cid_number_prefix:   Option<String>,
  pub distinctive_ring:    Option<String>,
  pub missed_call_app:     Option<String>,
  pub missed_call_data:    Option<String>,
  pub call_timeout:        u32,
  pub timeout_data:        String,
  pub forward_enabled:     bool,
  pub forward_destination: Option<String>,
  pub forward_toll_allow:  Option<String>,
  pub follow_me_enabled:   bool,
  pub greeting:            Option<String>,
  pub dialplan_id:         Option<String>,
}

impl RawRingGroup {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRingGroup {
      ring_group_id:       row.get(0)?,
      domain_id:           row.get(1)?,
      name:                row.get(2)?,
      extension:           row.get(3)?,
      description:         row.get(4)?,
      enabled:             row.get(5)?,
      strategy:            row.get(6)?,
      ringback:            row.get(7)?,
      caller_id_name:      row.get(8)?,
      caller_id_number:    row.get(9)?,
      cid_name_prefix:     row.get(10)?,
      cid_number_prefix:   row.get(11)?,
      distinctive_ring:    row.get(12)?,
      missed_call_app:     row.get(13)?,
      missed_call_data:    row.get(14)?,
      call_timeout:        row.get(15)?,
      timeout_data:        row.get(16)?,
      forward_enabled:     row.get(17)?,
      forward_destination: row.get(18)?,
      forward_toll_allow:  row.get(19)?,
      follow_me_enabled:   row.get(20)?,
      greeting:            row.get(21)?,
      dialplan_id:         row.get(22)?,
    })
  }

  pub fn into_ring_group(self) -> Result<RingGroup> {
    Ok(RingGroup {
      id:                  decode_uuid(&self.ring_group_id)?,
      domain_id:           decode_uuid(&self.domain_id)?,
      name:                self.name,
      extension:           self.extension,
      description:         self.description,
      enabled:             self.enabled,
      strategy:            self.strategy.parse()?,
      ringback:            self.ringback,
      caller_id_name:      self.caller_id_name,
      caller_id_number:    self.caller_id_number,
      cid_name_prefix:     self.cid_name_prefix,
      cid_number_prefix:   self.cid_number_prefix,
      distinctive_ring:    self.distinctive_ring,
      missed_call_app:     self.missed_call_app,
      missed_call_data:    self.missed_call_data,
      call_timeout:        self.call_timeout,
      timeout_data:        self.timeout_data,
      forward_enabled:     self.forward_enabled,
      forward_destination: self.forward_destination,
      forward_toll_allow:  self.forward_toll_allow,
      follow_me_enabled:   self.follow_me_enabled,
      greeting:            self.greeting,
      dialplan_id:         self
        .dialplan_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}

pub const DESTINATION_COLUMNS: &str =
  "destination_id, ring_group_id, number, sequence, timeout, delay, prompt";

/// Raw values read directly from a `ring_group_destinations` row.
pub struct RawDestination {
  pub destination_id: String,
  pub ring_group_id:  String,
  pub number:         String,
  pub sequence:       i32,
  pub timeout:        u32,
  pub delay:          u32,
  pub prompt:         bool,
}

impl RawDestination {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawDestination {
      destination_id: row.get(0)?,
      ring_group_id:  row.get(1)?,
      number:         row.get(2)?,
      sequence:       row.get(3)?,
      timeout:        row.get(4)?,
      delay:          row.get(5)?,
      prompt:         row.get(6)?,
    })
  }

  pub fn into_destination(self) -> Result<RingGroupDestination> {
    Ok(RingGroupDestination {
      id:            decode_uuid(&self.destination_id)?,
      ring_group_id: decode_uuid(&self.ring_group_id)?,
      number:        self.number,
      sequence:      self.sequence,
      timeout:       self.timeout,
      delay:         self.delay,
      prompt:        self.prompt,
    })
  }
}

pub const DIALPLAN_COLUMNS: &str = "
  dialplan_id, domain_id, app_id, name, number, destination, context,
  category, dp_continue, sequence, enabled, description, xml, updated_by,
  created_at, updated_at";

/// Raw values read directly from a `dialplans` row.
pub struct RawDialplan {
  pub dialplan_id: String,
  pub domain_id:   String,
  pub app_id:      String,
  pub name:        String,
  pub number:      String,
  pub destination: bool,
  pub context:     String,
  pub category:    String,
  pub dp_continue: bool,
  pub sequence:    i32,
  pub enabled:     bool,
  pub description: Option<String>,
  pub xml:         String,
  pub updated_by:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawDialplan {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawDialplan {
      dialplan_id: row.get(0)?,
      domain_id:   row.get(1)?,
      app_id:      row.get(2)?,
      name:        row.get(3)?,
      number:      row.get(4)?,
      destination: row.get(5)?,
      context:     row.get(6)?,
      category:    row.get(7)?,
      dp_continue: row.get(8)?,
      sequence:    row.get(9)?,
      enabled:     row.get(10)?,
      description: row.get(11)?,
      xml:         row.get(12)?,
      updated_by:  row.get(13)?,
      created_at:  row.get(14)?,
      updated_at:  row.get(15)?,
    })
  }

  pub fn into_dialplan(self) -> Result<Dialplan> {
    Ok(Dialplan {
      id:          decode_uuid(&self.dialplan_id)?,
      domain_id:   decode_uuid(&self.domain_id)?,
      app_id:      decode_uuid(&self.app_id)?,
      name:        self.name,
      number:      self.number,
      destination: self.destination,
      context:     self.context,
      category:    self.category,
      dp_continue: self.dp_continue,
      sequence:    self.sequence,
      enabled:     self.enabled,
      description: self.description,
      xml:         self.xml,
      updated_by:  self.updated_by,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
