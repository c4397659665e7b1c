//! [`RingGroupCompiler`]: loads a ring group's configuration from a
//! [`PbxStore`], renders it, and writes the result to its dialplan record.

use std::sync::Arc;

use ringplan_core::{
  dialplan::{Dialplan, NewDialplan},
  domain::Domain,
  extension::{ExtensionIndex, FollowMeChains},
  ring_group::{RingGroup, RingGroupDestination},
  store::PbxStore,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  render::{CompileInput, render},
  strategy::StrategyEngine,
};

/// Follow-me callback base URL used when no `dialplan/httapi_url` setting
/// exists.
pub const DEFAULT_HTTAPI_URL: &str = "http://127.0.0.1:8008";

/// Compiler settings supplied by the caller.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
  /// Fallback follow-me callback base URL.
  pub httapi_url: String,
  /// Recorded as `updated_by` on dialplans the compiler creates.
  pub user_name:  String,
}

impl Default for CompilerOptions {
  fn default() -> Self {
    Self {
      httapi_url: DEFAULT_HTTAPI_URL.to_owned(),
      user_name:  "system".to_owned(),
    }
  }
}

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

/// Compiles ring groups into their dialplan records.
///
/// Concurrent compiles of the same ring group are not serialized here; the
/// later save wins.
pub struct RingGroupCompiler<S> {
  store:   Arc<S>,
  options: CompilerOptions,
}

impl<S: PbxStore> RingGroupCompiler<S> {
  pub fn new(store: Arc<S>, options: CompilerOptions) -> Self {
    Self { store, options }
  }

  /// Compile the ring group with `id`. A missing ring group is `Ok(None)`.
  pub async fn compile_by_id(&self, id: Uuid) -> Result<Option<Uuid>> {
    let ring_group = self.store.get_ring_group(id).await.map_err(store_err)?;
    self.compile(ring_group.as_ref()).await
  }

  /// Render `ring_group` and save it to its dialplan, creating the dialplan
  /// if the group has none or its reference is stale.
  ///
  /// Returns the dialplan id, or `None` when no ring group was given.
  pub async fn compile(
    &self,
    ring_group: Option<&RingGroup>,
  ) -> Result<Option<Uuid>> {
    let Some(rg) = ring_group else {
      return Ok(None);
    };

    let domain = self.domain(rg.domain_id).await?;
    let mut dialplan = self.resolve_dialplan(rg, &domain).await?;
    dialplan.enabled = rg.enabled;
    dialplan.name = rg.name.clone();
    dialplan.number = rg.extension.clone();

    let index = self.extension_index(domain.id).await?;

    // Members are only rung locally when the group neither forwards nor
    // hands off to the follow-me callback; in that case follow-me is off
    // and no chains are consulted.
    let destinations = if rg.forward_enabled || rg.follow_me_enabled {
      Vec::new()
    } else {
      self.destinations(rg.id).await?
    };
    let chains = FollowMeChains::new();
    let httapi_url = if rg.follow_me_enabled && !rg.forward_enabled {
      self.httapi_url().await?
    } else {
      String::new()
    };

    let xml = render(&CompileInput {
      ring_group: rg,
      domain: &domain,
      dialplan: &dialplan,
      destinations: &destinations,
      index: &index,
      chains: &chains,
      httapi_url: &httapi_url,
    })?;

    dialplan.xml = xml;
    let saved = self.store.save_dialplan(dialplan).await.map_err(store_err)?;

    info!(
      ring_group = %rg.id,
      dialplan = %saved.id,
      extension = %rg.extension,
      strategy = %rg.strategy,
      "compiled ring group"
    );
    Ok(Some(saved.id))
  }

  /// Compile every ring group of a domain, in extension order.
  ///
  /// Returns `(ring group id, dialplan id)` pairs. Stops at the first error.
  pub async fn compile_domain(&self, domain_id: Uuid) -> Result<Vec<(Uuid, Uuid)>> {
    let ring_groups = self
      .store
      .list_ring_groups(domain_id)
      .await
      .map_err(store_err)?;

    let mut compiled = Vec::with_capacity(ring_groups.len());
    for rg in &ring_groups {
      if let Some(dialplan_id) = self.compile(Some(rg)).await? {
        compiled.push((rg.id, dialplan_id));
      }
    }
    Ok(compiled)
  }

  /// Build the bridge command for `ring_group` at call time, expanding
  /// follow-me chains. This is what the follow-me callback answers with when
  /// the compiled dialplan hands the call off.
  pub async fn bridge_command(&self, ring_group: &RingGroup) -> Result<String> {
    let domain = self.domain(ring_group.domain_id).await?;
    let index = self.extension_index(domain.id).await?;
    let destinations = self.destinations(ring_group.id).await?;
    let chains = self
      .follow_me_chains(ring_group, &destinations, &index)
      .await?;

    let engine = StrategyEngine::new(ring_group, &domain.name, &index, &chains);
    Ok(engine.bridge_command(&destinations))
  }

  // ── Loaders ───────────────────────────────────────────────────────────────

  async fn domain(&self, id: Uuid) -> Result<Domain> {
    self
      .store
      .get_domain(id)
      .await
      .map_err(store_err)?
      .ok_or(Error::Core(ringplan_core::Error::DomainNotFound(id)))
  }

  async fn resolve_dialplan(
    &self,
    rg: &RingGroup,
    domain: &Domain,
  ) -> Result<Dialplan> {
    if let Some(id) = rg.dialplan_id
      && let Some(dialplan) =
        self.store.get_dialplan(id).await.map_err(store_err)?
    {
      return Ok(dialplan);
    }

    debug!(
      ring_group = %rg.id,
      stale = ?rg.dialplan_id,
      "creating ring group dialplan"
    );
    let input = NewDialplan::for_ring_group(rg, domain, &self.options.user_name);
    let dialplan = self
      .store
      .create_dialplan(input)
      .await
      .map_err(store_err)?;
    self
      .store
      .set_ring_group_dialplan(rg.id, dialplan.id)
      .await
      .map_err(store_err)?;
    Ok(dialplan)
  }

  async fn extension_index(&self, domain_id: Uuid) -> Result<ExtensionIndex> {
    let extensions = self
      .store
      .list_extensions(domain_id, true)
      .await
      .map_err(store_err)?;
    Ok(ExtensionIndex::new(&extensions))
  }

  async fn destinations(
    &self,
    ring_group_id: Uuid,
  ) -> Result<Vec<RingGroupDestination>> {
    self
      .store
      .ring_group_destinations(ring_group_id)
      .await
      .map_err(store_err)
  }

  /// Load the chains of members that will be expanded: both the group and
  /// the member's extension must have follow-me enabled.
  async fn follow_me_chains(
    &self,
    rg: &RingGroup,
    destinations: &[RingGroupDestination],
    index: &ExtensionIndex,
  ) -> Result<FollowMeChains> {
    let mut chains = FollowMeChains::new();
    if !rg.follow_me_enabled {
      return Ok(chains);
    }

    for dest in destinations {
      if let Some(ext) = index.get(&dest.number)
        && ext.follow_me_enabled
      {
        let chain = self
          .store
          .follow_me_destinations(ext.id)
          .await
          .map_err(store_err)?;
        chains.insert(ext.id, chain);
      }
    }
    Ok(chains)
  }

  /// The follow-me callback base URL: the `dialplan/httapi_url` setting if
  /// present, else the configured fallback.
  async fn httapi_url(&self) -> Result<String> {
    let setting = self
      .store
      .default_setting("dialplan", "httapi_url")
      .await
      .map_err(store_err)?;
    Ok(setting.unwrap_or_else(|| self.options.httapi_url.clone()))
  }
}
