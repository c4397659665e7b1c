//! Extensions, follow-me chains, and the per-compile extension index.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A domain member reachable as `user/<extension>@<domain>`.
///
/// Only the attributes the dialplan compiler reads are modelled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
  pub id:                Uuid,
  pub domain_id:         Uuid,
  pub extension:         String,
  pub enabled:           bool,
  #[serde(default)]
  pub follow_me_enabled: bool,
}

/// One alternate destination in an extension's follow-me chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowMeDestination {
  pub id:           Uuid,
  pub extension_id: Uuid,
  pub destination:  String,
  pub sequence:     i32,
  pub timeout:      u32,
  #[serde(default)]
  pub delay:        u32,
  #[serde(default)]
  pub prompt:       bool,
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// What the compiler needs to know about a local extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedExtension {
  pub id:                Uuid,
  pub follow_me_enabled: bool,
}

/// Extension number → identity for the enabled extensions of one domain.
///
/// Built once per compile and read-only afterwards. A number that is not in
/// the index is treated as off-domain and routed through loopback.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIndex {
  entries: BTreeMap<String, IndexedExtension>,
}

impl ExtensionIndex {
  /// Index the enabled extensions among `extensions`. Disabled entries are
  /// skipped.
  pub fn new<'a>(extensions: impl IntoIterator<Item = &'a Extension>) -> Self {
    let entries = extensions
      .into_iter()
      .filter(|ext| ext.enabled)
      .map(|ext| {
        (ext.extension.clone(), IndexedExtension {
          id:                ext.id,
          follow_me_enabled: ext.follow_me_enabled,
        })
      })
      .collect();
    Self { entries }
  }

  pub fn get(&self, number: &str) -> Option<&IndexedExtension> {
    self.entries.get(number)
  }

  pub fn contains(&self, number: &str) -> bool {
    self.entries.contains_key(number)
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Follow-me chains ────────────────────────────────────────────────────────

/// Follow-me chains keyed by extension id, each held in ascending sequence
/// order.
#[derive(Debug, Clone, Default)]
pub struct FollowMeChains {
  chains: HashMap<Uuid, Vec<FollowMeDestination>>,
}

impl FollowMeChains {
  pub fn new() -> Self { Self::default() }

  /// Store the chain for `extension_id`, sorting it by sequence.
  pub fn insert(
    &mut self,
    extension_id: Uuid,
    mut chain: Vec<FollowMeDestination>,
  ) {
    chain.sort_by_key(|d| d.sequence);
    self.chains.insert(extension_id, chain);
  }

  /// The chain for `extension_id`; empty when none was loaded.
  pub fn chain(&self, extension_id: Uuid) -> &[FollowMeDestination] {
    self
      .chains
      .get(&extension_id)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}
