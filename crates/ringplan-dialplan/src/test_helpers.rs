//! Shared fixtures for unit tests.

use ringplan_core::{
  extension::{Extension, ExtensionIndex},
  ring_group::{RingGroup, RingGroupDestination, RingStrategy},
};
use uuid::Uuid;

pub(crate) const DOMAIN: &str = "pbx.example.com";

/// A ring group on extension 2000 plus enabled extensions 1001–1003.
pub(crate) struct Fixture {
  pub ring_group: RingGroup,
  pub extensions: Vec<Extension>,
  pub index:      ExtensionIndex,
}

impl Fixture {
  pub(crate) fn new(strategy: RingStrategy) -> Self {
    let domain_id = Uuid::new_v4();
    let extensions: Vec<Extension> = ["1001", "1002", "1003"]
      .into_iter()
      .map(|n| Extension {
        id:                Uuid::new_v4(),
        domain_id,
        extension:         n.into(),
        enabled:           true,
        follow_me_enabled: false,
      })
      .collect();
    let index = ExtensionIndex::new(&extensions);

    let mut ring_group = ring_group(domain_id);
    ring_group.strategy = strategy;

    Self {
      ring_group,
      extensions,
      index,
    }
  }

  pub(crate) fn ext_id(&self, number: &str) -> Uuid {
    self
      .extensions
      .iter()
      .find(|e| e.extension == number)
      .map(|e| e.id)
      .expect("fixture extension")
  }

  pub(crate) fn enable_follow_me(&mut self, number: &str) {
    for ext in self.extensions.iter_mut().filter(|e| e.extension == number) {
      ext.follow_me_enabled = true;
    }
    self.index = ExtensionIndex::new(&self.extensions);
  }
}

/// A plain ring group: no overrides, no forwarding, hang up on timeout.
pub(crate) fn ring_group(domain_id: Uuid) -> RingGroup {
  RingGroup {
    id: Uuid::new_v4(),
    domain_id,
    name: "Sales".into(),
    extension: "2000".into(),
    description: None,
    enabled: true,
    strategy: RingStrategy::Simultaneous,
    ringback: "${us-ring}".into(),
    caller_id_name: None,
    caller_id_number: None,
    cid_name_prefix: None,
    cid_number_prefix: None,
    distinctive_ring: None,
    missed_call_app: None,
    missed_call_data: None,
    call_timeout: 30,
    timeout_data: "hangup".into(),
    forward_enabled: false,
    forward_destination: None,
    forward_toll_allow: None,
    follow_me_enabled: false,
    greeting: None,
    dialplan_id: None,
  }
}

pub(crate) fn member(number: &str, timeout: u32) -> RingGroupDestination {
  RingGroupDestination {
    id: Uuid::new_v4(),
    ring_group_id: Uuid::nil(),
    number: number.into(),
    sequence: 0,
    timeout,
    delay: 0,
    prompt: false,
  }
}
