//! [`SqliteStore`] — the SQLite implementation of [`PbxStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use ringplan_core::{
  dialplan::{Dialplan, NewDialplan},
  domain::{DefaultSetting, Domain},
  extension::{Extension, FollowMeDestination},
  ring_group::{RingGroup, RingGroupDestination},
  store::PbxStore,
};

use crate::{
  Error, Result,
  encode::{
    DESTINATION_COLUMNS, DIALPLAN_COLUMNS, EXTENSION_COLUMNS, FOLLOW_ME_COLUMNS,
    RING_GROUP_COLUMNS, RawDestination, RawDialplan, RawDomain, RawExtension,
    RawFollowMe, RawRingGroup, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PBX configuration store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Seeding ───────────────────────────────────────────────────────────────
  //
  // Configuration is normally owned by the admin application; these writes
  // exist for fixtures and the CLI `seed` command.

  pub async fn add_domain(&self, domain: &Domain) -> Result<()> {
    let id = encode_uuid(domain.id);
    let name = domain.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO domains (domain_id, name) VALUES (?1, ?2)",
          rusqlite::params![id, name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_extension(&self, ext: &Extension) -> Result<()> {
    let id = encode_uuid(ext.id);
    let domain_id = encode_uuid(ext.domain_id);
    let number = ext.extension.clone();
    let (enabled, follow_me) = (ext.enabled, ext.follow_me_enabled);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO extensions (
             extension_id, domain_id, extension, enabled, follow_me_enabled
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id, domain_id, number, enabled, follow_me],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_follow_me_destination(
    &self,
    fmd: &FollowMeDestination,
  ) -> Result<()> {
    let id = encode_uuid(fmd.id);
    let extension_id = encode_uuid(fmd.extension_id);
    let fmd = fmd.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follow_me_destinations (
             follow_me_id, extension_id, destination, sequence, timeout,
             delay, prompt
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id,
            extension_id,
            fmd.destination,
            fmd.sequence,
            fmd.timeout,
            fmd.delay,
            fmd.prompt,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_ring_group(&self, rg: &RingGroup) -> Result<()> {
    let id = encode_uuid(rg.id);
    let domain_id = encode_uuid(rg.domain_id);
    let strategy = rg.strategy.as_str();
    let dialplan_id = rg.dialplan_id.map(encode_uuid);
    let rg = rg.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO ring_groups ({RING_GROUP_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
          ),
          rusqlite::params![
            id,
            domain_id,
            rg.name,
            rg.extension,
            rg.description,
            rg.enabled,
            strategy,
            rg.ringback,
            rg.caller_id_name,
            rg.caller_id_number,
            rg.cid_name_prefix,
            rg.cid_number_prefix,
            rg.distinctive_ring,
            rg.missed_call_app,
            rg.missed_call_data,
            rg.call_timeout,
            rg.timeout_data,
            rg.forward_enabled,
            rg.forward_destination,
            rg.forward_toll_allow,
            rg.follow_me_enabled,
            rg.greeting,
            dialplan_id,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn add_ring_group_destination(
    &self,
    dest: &RingGroupDestination,
  ) -> Result<()> {
    let id = encode_uuid(dest.id);
    let ring_group_id = encode_uuid(dest.ring_group_id);
    let dest = dest.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO ring_group_destinations ({DESTINATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            id,
            ring_group_id,
            dest.number,
            dest.sequence,
            dest.timeout,
            dest.delay,
            dest.prompt,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or replace a default setting.
  pub async fn set_default_setting(&self, setting: &DefaultSetting) -> Result<()> {
    let setting = setting.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO default_settings (category, subcategory, value)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (category, subcategory) DO UPDATE SET value = excluded.value",
          rusqlite::params![setting.category, setting.subcategory, setting.value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PbxStore impl ───────────────────────────────────────────────────────────

impl PbxStore for SqliteStore {
  type Error = Error;

  // ── Configuration reads ───────────────────────────────────────────────────

  async fn get_domain(&self, id: Uuid) -> Result<Option<Domain>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDomain> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT domain_id, name FROM domains WHERE domain_id = ?1",
              rusqlite::params![id_str],
              RawDomain::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDomain::into_domain).transpose()
  }

  async fn get_ring_group(&self, id: Uuid) -> Result<Option<RingGroup>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRingGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RING_GROUP_COLUMNS} FROM ring_groups
                 WHERE ring_group_id = ?1"
              ),
              rusqlite::params![id_str],
              RawRingGroup::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRingGroup::into_ring_group).transpose()
  }

  async fn list_ring_groups(&self, domain_id: Uuid) -> Result<Vec<RingGroup>> {
    let domain_str = encode_uuid(domain_id);

    let raws: Vec<RawRingGroup> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RING_GROUP_COLUMNS} FROM ring_groups
           WHERE domain_id = ?1
           ORDER BY extension, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![domain_str], RawRingGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRingGroup::into_ring_group).collect()
  }

  async fn ring_group_destinations(
    &self,
    ring_group_id: Uuid,
  ) -> Result<Vec<RingGroupDestination>> {
    let rg_str = encode_uuid(ring_group_id);

    let raws: Vec<RawDestination> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DESTINATION_COLUMNS} FROM ring_group_destinations
           WHERE ring_group_id = ?1
           ORDER BY sequence, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![rg_str], RawDestination::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawDestination::into_destination)
      .collect()
  }

  async fn list_extensions(
    &self,
    domain_id: Uuid,
    enabled_only: bool,
  ) -> Result<Vec<Extension>> {
    let domain_str = encode_uuid(domain_id);

    let raws: Vec<RawExtension> = self
      .conn
      .call(move |conn| {
        let filter = if enabled_only { "AND enabled = 1" } else { "" };
        let mut stmt = conn.prepare(&format!(
          "SELECT {EXTENSION_COLUMNS} FROM extensions
           WHERE domain_id = ?1 {filter}
           ORDER BY extension"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![domain_str], RawExtension::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawExtension::into_extension).collect()
  }

  async fn follow_me_destinations(
    &self,
    extension_id: Uuid,
  ) -> Result<Vec<FollowMeDestination>> {
    let ext_str = encode_uuid(extension_id);

    let raws: Vec<RawFollowMe> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FOLLOW_ME_COLUMNS} FROM follow_me_destinations
           WHERE extension_id = ?1
           ORDER BY sequence"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![ext_str], RawFollowMe::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollowMe::into_follow_me).collect()
  }

  async fn default_setting(
    &self,
    category: &str,
    subcategory: &str,
  ) -> Result<Option<String>> {
    let category = category.to_owned();
    let subcategory = subcategory.to_owned();

    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM default_settings
               WHERE category = ?1 AND subcategory = ?2",
              rusqlite::params![category, subcategory],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }

  // ── Dialplans ─────────────────────────────────────────────────────────────

  async fn get_dialplan(&self, id: Uuid) -> Result<Option<Dialplan>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDialplan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DIALPLAN_COLUMNS} FROM dialplans WHERE dialplan_id = ?1"
              ),
              rusqlite::params![id_str],
              RawDialplan::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDialplan::into_dialplan).transpose()
  }

  async fn create_dialplan(&self, input: NewDialplan) -> Result<Dialplan> {
    let now = Utc::now();
    let dialplan = Dialplan {
      id:          Uuid::new_v4(),
      domain_id:   input.domain_id,
      app_id:      input.app_id,
      name:        input.name,
      number:      input.number,
      destination: input.destination,
      context:     input.context,
      category:    input.category,
      dp_continue: input.dp_continue,
      sequence:    input.sequence,
      enabled:     input.enabled,
      description: input.description,
      xml:         String::new(),
      updated_by:  input.updated_by,
      created_at:  now,
      updated_at:  now,
    };

    let row = dialplan.clone();
    let id_str = encode_uuid(row.id);
    let domain_str = encode_uuid(row.domain_id);
    let app_str = encode_uuid(row.app_id);
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO dialplans ({DIALPLAN_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?15)"
          ),
          rusqlite::params![
            id_str,
            domain_str,
            app_str,
            row.name,
            row.number,
            row.destination,
            row.context,
            row.category,
            row.dp_continue,
            row.sequence,
            row.enabled,
            row.description,
            row.xml,
            row.updated_by,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(dialplan)
  }

  async fn save_dialplan(&self, mut dialplan: Dialplan) -> Result<Dialplan> {
    dialplan.updated_at = Utc::now();

    let row = dialplan.clone();
    let id_str = encode_uuid(row.id);
    let at_str = encode_dt(row.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE dialplans SET
             name = ?2, number = ?3, destination = ?4, context = ?5,
             category = ?6, dp_continue = ?7, sequence = ?8, enabled = ?9,
             description = ?10, xml = ?11, updated_by = ?12, updated_at = ?13
           WHERE dialplan_id = ?1",
          rusqlite::params![
            id_str,
            row.name,
            row.number,
            row.destination,
            row.context,
            row.category,
            row.dp_continue,
            row.sequence,
            row.enabled,
            row.description,
            row.xml,
            row.updated_by,
            at_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::DialplanNotFound(dialplan.id));
    }
    Ok(dialplan)
  }

  async fn set_ring_group_dialplan(
    &self,
    ring_group_id: Uuid,
    dialplan_id: Uuid,
  ) -> Result<()> {
    let rg_str = encode_uuid(ring_group_id);
    let dp_str = encode_uuid(dialplan_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE ring_groups SET dialplan_id = ?2 WHERE ring_group_id = ?1",
          rusqlite::params![rg_str, dp_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RingGroupNotFound(ring_group_id));
    }
    Ok(())
  }
}
