//! Bridge-string formatting.
//!
//! A bridge leg is written in the switch's inline-variable syntax:
//! `[k1=v1,k2=v2]target`. Legs are joined with a strategy separator and the
//! whole command is prefixed with a `<...>` channel-variable block.

use std::fmt;

/// Channel variables applied to every leg of a ring-group bridge.
pub const CHANNEL_VARS: &str = "<ignore_early_media=true>";

/// Prompt played to a member who must confirm before being connected.
pub const CONFIRM_FILE: &str = "ivr/ivr-accept_reject.wav";

/// DTMF key that accepts the call at the confirm prompt.
pub const CONFIRM_KEY: &str = "1";

// ─── Targets ─────────────────────────────────────────────────────────────────

/// The dial string a leg rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeTarget<'a> {
  /// A registered user in the domain.
  User { number: &'a str, domain: &'a str },
  /// Re-enter the dialplan; used for numbers outside the domain.
  Loopback { number: &'a str },
}

impl fmt::Display for BridgeTarget<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BridgeTarget::User { number, domain } => {
        write!(f, "user/{number}@{domain}")
      }
      BridgeTarget::Loopback { number } => write!(f, "loopback/{number}"),
    }
  }
}

// ─── Leg variables ───────────────────────────────────────────────────────────

/// The ordered `key=value` list for a single leg.
///
/// Values are written verbatim; `${...}` references are expanded by the
/// switch, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegVars {
  vars: Vec<String>,
}

impl LegVars {
  pub fn new() -> Self { Self::default() }

  /// Append `key=value`.
  pub fn set(&mut self, key: &str, value: impl fmt::Display) -> &mut Self {
    self.vars.push(format!("{key}={value}"));
    self
  }

  /// Render as `[k1=v1,k2=v2]target`.
  pub fn render(&self, target: &BridgeTarget<'_>) -> String {
    format!("[{}]{}", self.vars.join(","), target)
  }
}

// ─── Command assembly ────────────────────────────────────────────────────────

/// Join rendered legs with a strategy separator.
pub fn join_legs(legs: &[String], separator: &str) -> String {
  legs.join(separator)
}

/// Prefix a joined leg string with [`CHANNEL_VARS`].
pub fn with_channel_vars(joined: &str) -> String {
  format!("{CHANNEL_VARS}{joined}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_and_loopback_targets() {
    let user = BridgeTarget::User {
      number: "1001",
      domain: "pbx.example.com",
    };
    assert_eq!(user.to_string(), "user/1001@pbx.example.com");

    let loopback = BridgeTarget::Loopback {
      number: "07700900123",
    };
    assert_eq!(loopback.to_string(), "loopback/07700900123");
  }

  #[test]
  fn leg_keeps_insertion_order() {
    let mut vars = LegVars::new();
    vars
      .set("dialed_extension", "1001")
      .set("confirm", false)
      .set("leg_timeout", 30);

    let leg = vars.render(&BridgeTarget::Loopback { number: "1001" });
    assert_eq!(
      leg,
      "[dialed_extension=1001,confirm=false,leg_timeout=30]loopback/1001"
    );
  }

  #[test]
  fn empty_leg_renders_empty_brackets() {
    let leg = LegVars::new().render(&BridgeTarget::Loopback { number: "1" });
    assert_eq!(leg, "[]loopback/1");
  }

  #[test]
  fn command_is_prefixed_once() {
    let legs = vec!["[a=1]user/1@d".to_string(), "[a=2]user/2@d".to_string()];
    let joined = join_legs(&legs, "|");
    assert_eq!(
      with_channel_vars(&joined),
      "<ignore_early_media=true>[a=1]user/1@d|[a=2]user/2@d"
    );
  }

  #[test]
  fn no_legs_is_just_the_prefix() {
    assert_eq!(with_channel_vars(&join_legs(&[], ",")), CHANNEL_VARS);
  }
}
