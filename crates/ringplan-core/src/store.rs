//! The `PbxStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ringplan-store-sqlite`).
//! The compiler in `ringplan-dialplan` depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  dialplan::{Dialplan, NewDialplan},
  domain::Domain,
  extension::{Extension, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination},
};

/// Abstraction over the PBX configuration database.
///
/// Reads are keyed lookups. The only writes are the dialplan record and the
/// ring group's reference to it.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait PbxStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Configuration reads ───────────────────────────────────────────────

  /// Retrieve a domain by id. Returns `None` if not found.
  fn get_domain(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Domain>, Self::Error>> + Send + '_;

  /// Retrieve a ring group by id. Returns `None` if not found.
  fn get_ring_group(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<RingGroup>, Self::Error>> + Send + '_;

  /// List the ring groups of a domain, ordered by extension number.
  fn list_ring_groups(
    &self,
    domain_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RingGroup>, Self::Error>> + Send + '_;

  /// Members of a ring group, ordered by sequence then insertion order.
  fn ring_group_destinations(
    &self,
    ring_group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RingGroupDestination>, Self::Error>>
  + Send
  + '_;

  /// Extensions of a domain; with `enabled_only`, disabled ones are omitted.
  fn list_extensions(
    &self,
    domain_id: Uuid,
    enabled_only: bool,
  ) -> impl Future<Output = Result<Vec<Extension>, Self::Error>> + Send + '_;

  /// The follow-me chain of an extension in ascending sequence order.
  fn follow_me_destinations(
    &self,
    extension_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FollowMeDestination>, Self::Error>>
  + Send
  + '_;

  /// Look up a default setting value by category and subcategory.
  fn default_setting<'a>(
    &'a self,
    category: &'a str,
    subcategory: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  // ── Dialplans ─────────────────────────────────────────────────────────

  /// Retrieve a dialplan by id. Returns `None` if not found.
  fn get_dialplan(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Dialplan>, Self::Error>> + Send + '_;

  /// Create and persist a dialplan with an empty body. The id and timestamps
  /// are assigned by the store.
  fn create_dialplan(
    &self,
    input: NewDialplan,
  ) -> impl Future<Output = Result<Dialplan, Self::Error>> + Send + '_;

  /// Overwrite every mutable column of an existing dialplan. The store sets
  /// `updated_at` and returns the saved record.
  fn save_dialplan(
    &self,
    dialplan: Dialplan,
  ) -> impl Future<Output = Result<Dialplan, Self::Error>> + Send + '_;

  /// Point a ring group at its (re)created dialplan.
  fn set_ring_group_dialplan(
    &self,
    ring_group_id: Uuid,
    dialplan_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
