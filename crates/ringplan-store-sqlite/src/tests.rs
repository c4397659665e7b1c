//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use ringplan_core::{
  dialplan::{Dialplan, NewDialplan, RING_GROUP_APP_ID},
  domain::{DefaultSetting, Domain},
  extension::{Extension, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination, RingStrategy},
  store::PbxStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn seeded() -> (SqliteStore, Domain) {
  let s = store().await;
  let domain = Domain {
    id:   Uuid::new_v4(),
    name: "pbx.example.com".into(),
  };
  s.add_domain(&domain).await.unwrap();
  (s, domain)
}

fn extension(domain: &Domain, number: &str, enabled: bool) -> Extension {
  Extension {
    id: Uuid::new_v4(),
    domain_id: domain.id,
    extension: number.into(),
    enabled,
    follow_me_enabled: false,
  }
}

fn ring_group(domain: &Domain, extension: &str) -> RingGroup {
  RingGroup {
    id:                  Uuid::new_v4(),
    domain_id:           domain.id,
    name:                format!("Group {extension}"),
    extension:           extension.into(),
    description:         Some("front desk".into()),
    enabled:             true,
    strategy:            RingStrategy::Enterprise,
    ringback:            "${uk-ring}".into(),
    caller_id_name:      Some("Reception".into()),
    caller_id_number:    None,
    cid_name_prefix:     None,
    cid_number_prefix:   Some("9".into()),
    distinctive_ring:    None,
    missed_call_app:     None,
    missed_call_data:    None,
    call_timeout:        45,
    timeout_data:        "transfer:1000 XML pbx.example.com".into(),
    forward_enabled:     false,
    forward_destination: None,
    forward_toll_allow:  Some("local".into()),
    follow_me_enabled:   true,
    greeting:            None,
    dialplan_id:         None,
  }
}

fn destination(rg: &RingGroup, number: &str, sequence: i32) -> RingGroupDestination {
  RingGroupDestination {
    id: Uuid::new_v4(),
    ring_group_id: rg.id,
    number: number.into(),
    sequence,
    timeout: 30,
    delay: 0,
    prompt: false,
  }
}

// ─── Configuration reads ─────────────────────────────────────────────────────

#[tokio::test]
async fn get_domain_round_trip() {
  let (s, domain) = seeded().await;
  assert_eq!(s.get_domain(domain.id).await.unwrap(), Some(domain));
  assert!(s.get_domain(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn ring_group_round_trip() {
  let (s, domain) = seeded().await;
  let rg = ring_group(&domain, "2000");
  s.add_ring_group(&rg).await.unwrap();

  let fetched = s.get_ring_group(rg.id).await.unwrap();
  assert_eq!(fetched, Some(rg));
}

#[tokio::test]
async fn get_ring_group_missing_returns_none() {
  let s = store().await;
  assert!(s.get_ring_group(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_ring_groups_by_extension() {
  let (s, domain) = seeded().await;
  for ext in ["2002", "2000", "2001"] {
    s.add_ring_group(&ring_group(&domain, ext)).await.unwrap();
  }

  let other = Domain {
    id:   Uuid::new_v4(),
    name: "other.example.com".into(),
  };
  s.add_domain(&other).await.unwrap();
  s.add_ring_group(&ring_group(&other, "2003")).await.unwrap();

  let groups = s.list_ring_groups(domain.id).await.unwrap();
  let exts: Vec<_> = groups.iter().map(|g| g.extension.as_str()).collect();
  assert_eq!(exts, ["2000", "2001", "2002"]);
}

#[tokio::test]
async fn list_extensions_filters_disabled() {
  let (s, domain) = seeded().await;
  s.add_extension(&extension(&domain, "1001", true)).await.unwrap();
  s.add_extension(&extension(&domain, "1002", false)).await.unwrap();

  assert_eq!(s.list_extensions(domain.id, false).await.unwrap().len(), 2);

  let enabled = s.list_extensions(domain.id, true).await.unwrap();
  assert_eq!(enabled.len(), 1);
  assert_eq!(enabled[0].extension, "1001");
}

#[tokio::test]
async fn destinations_ordered_by_sequence_then_insertion() {
  let (s, domain) = seeded().await;
  let rg = ring_group(&domain, "2000");
  s.add_ring_group(&rg).await.unwrap();

  for (number, sequence) in [("c", 20), ("a", 10), ("d", 20), ("b", 10)] {
    s.add_ring_group_destination(&destination(&rg, number, sequence))
      .await
      .unwrap();
  }

  let numbers: Vec<_> = s
    .ring_group_destinations(rg.id)
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.number)
    .collect();
  assert_eq!(numbers, ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn destination_requires_live_ring_group() {
  let (s, domain) = seeded().await;
  let orphan = ring_group(&domain, "2000");
  let result = s
    .add_ring_group_destination(&destination(&orphan, "1001", 0))
    .await;
  assert!(matches!(result, Err(Error::Database(_))));
}

#[tokio::test]
async fn follow_me_chain_in_sequence_order() {
  let (s, domain) = seeded().await;
  let ext = extension(&domain, "1001", true);
  s.add_extension(&ext).await.unwrap();

  for (destination, sequence) in [("07700900002", 2), ("07700900001", 1)] {
    s.add_follow_me_destination(&FollowMeDestination {
      id: Uuid::new_v4(),
      extension_id: ext.id,
      destination: destination.into(),
      sequence,
      timeout: 20,
      delay: 5,
      prompt: true,
    })
    .await
    .unwrap();
  }

  let chain = s.follow_me_destinations(ext.id).await.unwrap();
  assert_eq!(chain.len(), 2);
  assert_eq!(chain[0].destination, "07700900001");
  assert_eq!(chain[1].destination, "07700900002");
  assert!(chain[0].prompt);
  assert_eq!(chain[0].delay, 5);
}

#[tokio::test]
async fn follow_me_sequence_is_unique_per_extension() {
  let (s, domain) = seeded().await;
  let ext = extension(&domain, "1001", true);
  s.add_extension(&ext).await.unwrap();

  let fmd = FollowMeDestination {
    id:           Uuid::new_v4(),
    extension_id: ext.id,
    destination:  "1002".into(),
    sequence:     1,
    timeout:      20,
    delay:        0,
    prompt:       false,
  };
  s.add_follow_me_destination(&fmd).await.unwrap();

  let duplicate = FollowMeDestination {
    id: Uuid::new_v4(),
    ..fmd
  };
  assert!(s.add_follow_me_destination(&duplicate).await.is_err());
}

#[tokio::test]
async fn default_setting_upsert() {
  let s = store().await;
  assert!(s.default_setting("dialplan", "httapi_url").await.unwrap().is_none());

  for value in ["http://10.0.0.1:8008", "http://10.0.0.2:8008"] {
    s.set_default_setting(&DefaultSetting {
      category:    "dialplan".into(),
      subcategory: "httapi_url".into(),
      value:       value.into(),
    })
    .await
    .unwrap();
  }

  assert_eq!(
    s.default_setting("dialplan", "httapi_url").await.unwrap().as_deref(),
    Some("http://10.0.0.2:8008")
  );
}

// ─── Dialplans ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_get_and_save_dialplan() {
  let (s, domain) = seeded().await;
  let rg = ring_group(&domain, "2000");
  s.add_ring_group(&rg).await.unwrap();

  let created = s
    .create_dialplan(NewDialplan::for_ring_group(&rg, &domain, "admin"))
    .await
    .unwrap();
  assert_eq!(created.app_id, RING_GROUP_APP_ID);
  assert_eq!(created.context, "pbx.example.com");
  assert_eq!(created.updated_by, "admin");
  assert!(created.xml.is_empty());

  let fetched = s.get_dialplan(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.number, "2000");

  let mut edited = fetched;
  edited.xml = "<extension/>".into();
  edited.enabled = false;
  let saved = s.save_dialplan(edited).await.unwrap();
  assert!(saved.updated_at >= created.updated_at);

  let reread = s.get_dialplan(created.id).await.unwrap().unwrap();
  assert_eq!(reread.xml, "<extension/>");
  assert!(!reread.enabled);
  assert_eq!(reread.created_at, created.created_at);
}

#[tokio::test]
async fn save_missing_dialplan_fails() {
  let (s, domain) = seeded().await;
  let now = Utc::now();
  let ghost = Dialplan {
    id:          Uuid::new_v4(),
    domain_id:   domain.id,
    app_id:      RING_GROUP_APP_ID,
    name:        "ghost".into(),
    number:      "0".into(),
    destination: false,
    context:     domain.name.clone(),
    category:    "Ring group".into(),
    dp_continue: false,
    sequence:    101,
    enabled:     true,
    description: None,
    xml:         String::new(),
    updated_by:  "system".into(),
    created_at:  now,
    updated_at:  now,
  };

  let id = ghost.id;
  assert!(matches!(
    s.save_dialplan(ghost).await,
    Err(Error::DialplanNotFound(missing)) if missing == id
  ));
}

#[tokio::test]
async fn link_ring_group_to_dialplan() {
  let (s, domain) = seeded().await;
  let rg = ring_group(&domain, "2000");
  s.add_ring_group(&rg).await.unwrap();

  let dp = s
    .create_dialplan(NewDialplan::for_ring_group(&rg, &domain, "system"))
    .await
    .unwrap();
  s.set_ring_group_dialplan(rg.id, dp.id).await.unwrap();

  let fetched = s.get_ring_group(rg.id).await.unwrap().unwrap();
  assert_eq!(fetched.dialplan_id, Some(dp.id));

  assert!(matches!(
    s.set_ring_group_dialplan(Uuid::new_v4(), dp.id).await,
    Err(Error::RingGroupNotFound(_))
  ));
}
