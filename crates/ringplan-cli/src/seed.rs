//! JSON fixtures for loading PBX configuration into a store.
//!
//! ```json
//! {
//!   "domains":      [{ "id": "…", "name": "pbx.example.com" }],
//!   "extensions":   [{ "id": "…", "domain_id": "…", "extension": "1001", "enabled": true }],
//!   "follow_me":    [],
//!   "ring_groups":  [{ "id": "…", "domain_id": "…", "name": "Sales", … }],
//!   "destinations": [{ "id": "…", "ring_group_id": "…", "number": "1001", "timeout": 30 }],
//!   "settings":     [{ "category": "dialplan", "subcategory": "httapi_url", "value": "…" }]
//! }
//! ```
//!
//! Every section is optional.

use ringplan_core::{
  domain::{DefaultSetting, Domain},
  extension::{Extension, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination},
};
use ringplan_store_sqlite::{Result, SqliteStore};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
  pub domains:      Vec<Domain>,
  pub extensions:   Vec<Extension>,
  pub follow_me:    Vec<FollowMeDestination>,
  pub ring_groups:  Vec<RingGroup>,
  pub destinations: Vec<RingGroupDestination>,
  pub settings:     Vec<DefaultSetting>,
}

impl SeedFile {
  pub fn from_json(src: &str) -> serde_json::Result<Self> {
    serde_json::from_str(src)
  }

  /// Write every record to `store`, parents before children.
  ///
  /// Not transactional: a failure leaves earlier records in place.
  pub async fn apply(&self, store: &SqliteStore) -> Result<()> {
    for domain in &self.domains {
      store.add_domain(domain).await?;
    }
    for ext in &self.extensions {
      store.add_extension(ext).await?;
    }
    for fmd in &self.follow_me {
      store.add_follow_me_destination(fmd).await?;
    }
    for rg in &self.ring_groups {
      store.add_ring_group(rg).await?;
    }
    for dest in &self.destinations {
      store.add_ring_group_destination(dest).await?;
    }
    for setting in &self.settings {
      store.set_default_setting(setting).await?;
    }

    info!(
      domains = self.domains.len(),
      extensions = self.extensions.len(),
      ring_groups = self.ring_groups.len(),
      destinations = self.destinations.len(),
      "seeded store"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use ringplan_core::{ring_group::RingStrategy, store::PbxStore};
  use uuid::Uuid;

  use super::*;

  const DOMAIN_ID: &str = "0b0e3a52-3d5c-4d5e-9a0e-5a7e1c2f0001";
  const EXT_ID: &str = "0b0e3a52-3d5c-4d5e-9a0e-5a7e1c2f0002";
  const RG_ID: &str = "0b0e3a52-3d5c-4d5e-9a0e-5a7e1c2f0003";

  fn fixture() -> String {
    format!(
      r#"{{
        "domains": [{{ "id": "{DOMAIN_ID}", "name": "pbx.example.com" }}],
        "extensions": [{{
          "id": "{EXT_ID}", "domain_id": "{DOMAIN_ID}",
          "extension": "1001", "enabled": true, "follow_me_enabled": true
        }}],
        "follow_me": [{{
          "id": "{}", "extension_id": "{EXT_ID}",
          "destination": "07700900123", "sequence": 1, "timeout": 20
        }}],
        "ring_groups": [{{
          "id": "{RG_ID}", "domain_id": "{DOMAIN_ID}",
          "name": "Sales", "extension": "2000", "enabled": true,
          "strategy": "sequential", "ringback": "${{us-ring}}",
          "call_timeout": 30, "timeout_data": "hangup"
        }}],
        "destinations": [{{
          "id": "{}", "ring_group_id": "{RG_ID}",
          "number": "1001", "timeout": 30
        }}],
        "settings": [{{
          "category": "dialplan", "subcategory": "httapi_url",
          "value": "http://10.0.0.1:8008"
        }}]
      }}"#,
      Uuid::new_v4(),
      Uuid::new_v4(),
    )
  }

  #[test]
  fn sections_are_optional() {
    let seed = SeedFile::from_json("{}").unwrap();
    assert!(seed.domains.is_empty());
    assert!(seed.ring_groups.is_empty());
  }

  #[test]
  fn ring_group_defaults_fill_in() {
    let seed = SeedFile::from_json(&fixture()).unwrap();
    let rg = &seed.ring_groups[0];
    assert_eq!(rg.strategy, RingStrategy::Sequential);
    assert!(!rg.forward_enabled);
    assert!(!rg.follow_me_enabled);
    assert_eq!(rg.caller_id_name, None);
    assert_eq!(rg.dialplan_id, None);
    assert_eq!(seed.destinations[0].sequence, 0);
  }

  #[tokio::test]
  async fn apply_loads_every_section() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    SeedFile::from_json(&fixture())
      .unwrap()
      .apply(&store)
      .await
      .unwrap();

    let domain_id: Uuid = DOMAIN_ID.parse().unwrap();
    let rg_id: Uuid = RG_ID.parse().unwrap();
    let ext_id: Uuid = EXT_ID.parse().unwrap();

    assert!(store.get_domain(domain_id).await.unwrap().is_some());
    assert_eq!(store.list_ring_groups(domain_id).await.unwrap().len(), 1);
    assert_eq!(store.ring_group_destinations(rg_id).await.unwrap().len(), 1);
    assert_eq!(store.follow_me_destinations(ext_id).await.unwrap().len(), 1);
    assert_eq!(
      store
        .default_setting("dialplan", "httapi_url")
        .await
        .unwrap()
        .as_deref(),
      Some("http://10.0.0.1:8008")
    );
  }

  #[tokio::test]
  async fn orphaned_destination_fails() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let src = format!(
      r#"{{ "destinations": [{{
        "id": "{}", "ring_group_id": "{RG_ID}", "number": "1001", "timeout": 30
      }}] }}"#,
      Uuid::new_v4(),
    );
    let seed = SeedFile::from_json(&src).unwrap();
    assert!(seed.apply(&store).await.is_err());
  }
}
