//! Ring groups, their member destinations, and the small value types that
//! describe how a group rings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Strategy ────────────────────────────────────────────────────────────────

/// How a call is presented to the members of a ring group.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RingStrategy {
  /// Try each member in turn.
  #[default]
  Sequential,
  /// Ring every member at once; the first to answer wins.
  Simultaneous,
  /// Ring every member at once as a single logical call.
  Enterprise,
}

impl RingStrategy {
  /// The separator the switch uses between bridge legs for this strategy.
  pub fn separator(self) -> &'static str {
    match self {
      RingStrategy::Sequential => "|",
      RingStrategy::Simultaneous => ",",
      RingStrategy::Enterprise => "_",
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      RingStrategy::Sequential => "sequential",
      RingStrategy::Simultaneous => "simultaneous",
      RingStrategy::Enterprise => "enterprise",
    }
  }
}

impl fmt::Display for RingStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RingStrategy {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "sequential" => Ok(RingStrategy::Sequential),
      "simultaneous" => Ok(RingStrategy::Simultaneous),
      "enterprise" => Ok(RingStrategy::Enterprise),
      other => Err(Error::UnknownStrategy(other.to_owned())),
    }
  }
}

// ─── Timeout action ──────────────────────────────────────────────────────────

/// The dialplan application run when no member answers, parsed from an
/// `"app:data"` string such as `transfer:1000 XML example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutAction {
  pub application: String,
  /// `None` for `hangup`, which takes no argument.
  pub data:        Option<String>,
}

impl TimeoutAction {
  pub const HANGUP: &'static str = "hangup";

  /// `true` when the string had no `:` separator and was accepted as a bare
  /// application name.
  pub fn is_bare(s: &str) -> bool { !s.contains(':') }
}

impl FromStr for TimeoutAction {
  type Err = Error;

  /// Splits on the first `:` only, so the data part may contain colons
  /// (`bridge:sofia/gateway/gw/1000`).
  fn from_str(s: &str) -> Result<Self> {
    let (application, data) = match s.split_once(':') {
      Some((app, data)) => (app.trim(), Some(data)),
      None => (s.trim(), None),
    };

    if application.is_empty() {
      return Err(Error::InvalidTimeoutAction(s.to_owned()));
    }

    if application == Self::HANGUP {
      return Ok(TimeoutAction {
        application: Self::HANGUP.to_owned(),
        data:        None,
      });
    }

    Ok(TimeoutAction {
      application: application.to_owned(),
      data:        data.map(str::to_owned),
    })
  }
}

// ─── Ring group ──────────────────────────────────────────────────────────────

/// A ring group as configured by an administrator.
///
/// Optional text fields treat `Some("")` the same as `None`; use
/// [`RingGroup::caller_id_name`] and friends rather than the raw fields when
/// deciding whether an override is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingGroup {
  pub id:                  Uuid,
  pub domain_id:           Uuid,
  pub name:                String,
  pub extension:           String,
  #[serde(default)]
  pub description:         Option<String>,
  pub enabled:             bool,
  #[serde(default)]
  pub strategy:            RingStrategy,
  /// Ringback tone variable, e.g. `${us-ring}`.
  pub ringback:            String,
  pub caller_id_name:      Option<String>,
  pub caller_id_number:    Option<String>,
  pub cid_name_prefix:     Option<String>,
  pub cid_number_prefix:   Option<String>,
  /// Value exported as the SIP `Alert-Info` header.
  pub distinctive_ring:    Option<String>,
  pub missed_call_app:     Option<String>,
  pub missed_call_data:    Option<String>,
  /// Seconds before the timeout action runs.
  pub call_timeout:        u32,
  /// `"app:data"` string; see [`TimeoutAction`].
  pub timeout_data:        String,
  #[serde(default)]
  pub forward_enabled:     bool,
  pub forward_destination: Option<String>,
  pub forward_toll_allow:  Option<String>,
  #[serde(default)]
  pub follow_me_enabled:   bool,
  pub greeting:            Option<String>,
  /// The routing program generated for this group, if any. May be stale.
  #[serde(default)]
  pub dialplan_id:         Option<Uuid>,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

impl RingGroup {
  pub fn caller_id_name(&self) -> Option<&str> { present(&self.caller_id_name) }

  pub fn caller_id_number(&self) -> Option<&str> {
    present(&self.caller_id_number)
  }

  pub fn cid_name_prefix(&self) -> Option<&str> {
    present(&self.cid_name_prefix)
  }

  pub fn cid_number_prefix(&self) -> Option<&str> {
    present(&self.cid_number_prefix)
  }

  pub fn distinctive_ring(&self) -> Option<&str> {
    present(&self.distinctive_ring)
  }

  pub fn missed_call_app(&self) -> Option<&str> {
    present(&self.missed_call_app)
  }

  pub fn greeting(&self) -> Option<&str> { present(&self.greeting) }

  /// Toll class applied to off-domain legs; empty when unset.
  pub fn toll_allow(&self) -> &str {
    self.forward_toll_allow.as_deref().unwrap_or_default()
  }

  pub fn forward_destination(&self) -> &str {
    self.forward_destination.as_deref().unwrap_or_default()
  }

  pub fn timeout_action(&self) -> Result<TimeoutAction> {
    self.timeout_data.parse()
  }
}

// ─── Destinations ────────────────────────────────────────────────────────────

/// One member of a ring group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingGroupDestination {
  pub id:            Uuid,
  pub ring_group_id: Uuid,
  pub number:        String,
  /// Position within the group. Stores return members ordered by this, then
  /// by insertion order.
  #[serde(default)]
  pub sequence:      i32,
  /// Per-leg ring time in seconds.
  pub timeout:       u32,
  /// Seconds to wait before this leg starts ringing.
  #[serde(default)]
  pub delay:         u32,
  /// Ask the answering party to confirm before the call is connected.
  #[serde(default)]
  pub prompt:        bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strategy_separators() {
    assert_eq!(RingStrategy::Sequential.separator(), "|");
    assert_eq!(RingStrategy::Simultaneous.separator(), ",");
    assert_eq!(RingStrategy::Enterprise.separator(), "_");
  }

  #[test]
  fn strategy_parses_stored_names() {
    assert_eq!(
      "enterprise".parse::<RingStrategy>().unwrap(),
      RingStrategy::Enterprise
    );
    assert!(matches!(
      "round-robin".parse::<RingStrategy>(),
      Err(Error::UnknownStrategy(_))
    ));
  }

  #[test]
  fn hangup_has_no_data() {
    let action: TimeoutAction = "hangup".parse().unwrap();
    assert_eq!(action.application, "hangup");
    assert_eq!(action.data, None);

    // Data after hangup is dropped.
    let action: TimeoutAction = "hangup:NORMAL_CLEARING".parse().unwrap();
    assert_eq!(action.data, None);
  }

  #[test]
  fn transfer_keeps_data() {
    let action: TimeoutAction = "transfer:1000 XML example.com".parse().unwrap();
    assert_eq!(action.application, "transfer");
    assert_eq!(action.data.as_deref(), Some("1000 XML example.com"));
  }

  #[test]
  fn data_may_contain_colons() {
    let action: TimeoutAction =
      "bridge:sofia/gateway/gw1/1000:5060".parse().unwrap();
    assert_eq!(action.application, "bridge");
    assert_eq!(action.data.as_deref(), Some("sofia/gateway/gw1/1000:5060"));
  }

  #[test]
  fn bare_application_is_accepted() {
    let action: TimeoutAction = "voicemail".parse().unwrap();
    assert_eq!(action.application, "voicemail");
    assert_eq!(action.data, None);
    assert!(TimeoutAction::is_bare("voicemail"));
  }

  #[test]
  fn empty_action_is_rejected() {
    assert!(matches!(
      "".parse::<TimeoutAction>(),
      Err(Error::InvalidTimeoutAction(_))
    ));
    assert!(matches!(
      ":1000".parse::<TimeoutAction>(),
      Err(Error::InvalidTimeoutAction(_))
    ));
  }

  #[test]
  fn empty_overrides_count_as_unset() {
    let rg: RingGroup = serde_json::from_value(serde_json::json!({
      "id": Uuid::nil(),
      "domain_id": Uuid::nil(),
      "name": "Sales",
      "extension": "2000",
      "enabled": true,
      "ringback": "${us-ring}",
      "caller_id_name": "",
      "caller_id_number": "01234",
      "cid_name_prefix": null,
      "cid_number_prefix": null,
      "distinctive_ring": null,
      "missed_call_app": null,
      "missed_call_data": null,
      "call_timeout": 30,
      "timeout_data": "hangup",
      "forward_destination": null,
      "forward_toll_allow": null,
      "greeting": null
    }))
    .unwrap();

    assert_eq!(rg.caller_id_name(), None);
    assert_eq!(rg.caller_id_number(), Some("01234"));
    assert_eq!(rg.strategy, RingStrategy::Sequential);
    assert_eq!(rg.toll_allow(), "");
  }
}
