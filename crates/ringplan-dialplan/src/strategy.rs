//! Bridge construction for ring-group members.
//!
//! Each member becomes one leg, unless both the ring group and the member's
//! extension have follow-me enabled, in which case the member is replaced by
//! one leg per entry in the extension's follow-me chain.

use ringplan_core::{
  extension::{ExtensionIndex, FollowMeChains, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination},
};
use tracing::debug;

use crate::bridge::{
  BridgeTarget, CONFIRM_FILE, CONFIRM_KEY, LegVars, join_legs,
  with_channel_vars,
};

/// Per-leg settings, shared by direct members and follow-me entries.
#[derive(Debug, Clone, Copy)]
struct LegParams<'a> {
  number:    &'a str,
  prompt:    bool,
  timeout:   u32,
  delay:     u32,
  /// Follow-me entries ring off-domain numbers with early media ignored.
  follow_me: bool,
}

impl<'a> From<&'a RingGroupDestination> for LegParams<'a> {
  fn from(d: &'a RingGroupDestination) -> Self {
    LegParams {
      number:    &d.number,
      prompt:    d.prompt,
      timeout:   d.timeout,
      delay:     d.delay,
      follow_me: false,
    }
  }
}

impl<'a> From<&'a FollowMeDestination> for LegParams<'a> {
  fn from(d: &'a FollowMeDestination) -> Self {
    LegParams {
      number:    &d.destination,
      prompt:    d.prompt,
      timeout:   d.timeout,
      delay:     d.delay,
      follow_me: true,
    }
  }
}

/// Builds the bridge command for one ring group.
///
/// Holds only borrowed, read-only state, so the same engine can render any
/// number of destination lists without interference.
#[derive(Debug, Clone, Copy)]
pub struct StrategyEngine<'a> {
  ring_group: &'a RingGroup,
  domain:     &'a str,
  index:      &'a ExtensionIndex,
  chains:     &'a FollowMeChains,
}

impl<'a> StrategyEngine<'a> {
  pub fn new(
    ring_group: &'a RingGroup,
    domain: &'a str,
    index: &'a ExtensionIndex,
    chains: &'a FollowMeChains,
  ) -> Self {
    Self {
      ring_group,
      domain,
      index,
      chains,
    }
  }

  /// One rendered leg per ringing destination, in ring order.
  pub fn build_bridge_targets(
    &self,
    destinations: &[RingGroupDestination],
  ) -> Vec<String> {
    let mut legs = Vec::with_capacity(destinations.len());

    for dest in destinations {
      match self.index.get(&dest.number) {
        Some(ext) if self.ring_group.follow_me_enabled && ext.follow_me_enabled => {
          let chain = self.chains.chain(ext.id);
          debug!(
            number = %dest.number,
            legs = chain.len(),
            "expanding follow-me chain"
          );
          legs.extend(chain.iter().map(|fmd| self.leg(fmd.into())));
        }
        _ => legs.push(self.leg(dest.into())),
      }
    }

    legs
  }

  /// The full `bridge` application data: legs joined by the strategy
  /// separator and prefixed with the channel-variable block.
  pub fn bridge_command(&self, destinations: &[RingGroupDestination]) -> String {
    let legs = self.build_bridge_targets(destinations);
    with_channel_vars(&join_legs(&legs, self.ring_group.strategy.separator()))
  }

  fn leg(&self, params: LegParams<'_>) -> String {
    let mut vars = LegVars::new();

    let target = match self.index.get(params.number) {
      Some(ext) => {
        vars
          .set("dialed_extension", params.number)
          .set("extension_uuid", ext.id);
        BridgeTarget::User {
          number: params.number,
          domain: self.domain,
        }
      }
      None => {
        if params.follow_me {
          vars.set("ignore_early_media", true);
        }
        vars
          .set("toll_allow", self.ring_group.toll_allow())
          .set("origination_caller_id_name", "${rg_ob_caller_id_name}")
          .set("origination_caller_id_number", "${rg_ob_caller_id_number}");
        BridgeTarget::Loopback {
          number: params.number,
        }
      }
    };

    vars.set("sip_invite_domain", self.domain);

    if params.prompt {
      vars
        .set("confirm", true)
        .set("group_confirm_file", CONFIRM_FILE)
        .set("group_confirm_key", CONFIRM_KEY);
    } else {
      vars.set("confirm", false);
    }

    vars
      .set("leg_timeout", params.timeout)
      .set("leg_delay_start", params.delay);

    vars.render(&target)
  }
}
