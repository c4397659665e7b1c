//! SQL schema for the ringplan SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS domains (
    domain_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS extensions (
    extension_id      TEXT PRIMARY KEY,
    domain_id         TEXT NOT NULL REFERENCES domains(domain_id),
    extension         TEXT NOT NULL,
    enabled           INTEGER NOT NULL DEFAULT 1,
    follow_me_enabled INTEGER NOT NULL DEFAULT 0,
    UNIQUE (domain_id, extension)
);

-- One chain per extension, strictly ordered by sequence.
CREATE TABLE IF NOT EXISTS follow_me_destinations (
    follow_me_id  TEXT PRIMARY KEY,
    extension_id  TEXT NOT NULL REFERENCES extensions(extension_id) ON DELETE CASCADE,
    destination   TEXT NOT NULL,
    sequence      INTEGER NOT NULL,
    timeout       INTEGER NOT NULL DEFAULT 30,
    delay         INTEGER NOT NULL DEFAULT 0,
    prompt        INTEGER NOT NULL DEFAULT 0,
    UNIQUE (extension_id, sequence)
);

-- The xml body is rewritten in full on every compile.
CREATE TABLE IF NOT EXISTS dialplans (
    dialplan_id  TEXT PRIMARY KEY,
    domain_id    TEXT NOT NULL REFERENCES domains(domain_id),
    app_id       TEXT NOT NULL,
    name         TEXT NOT NULL,
    number       TEXT NOT NULL,
    destination  INTEGER NOT NULL DEFAULT 0,
    context      TEXT NOT NULL,
    category     TEXT NOT NULL,
    dp_continue  INTEGER NOT NULL DEFAULT 0,
    sequence     INTEGER NOT NULL,
    enabled      INTEGER NOT NULL,
    description  TEXT,
    xml          TEXT NOT NULL DEFAULT '',
    updated_by   TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- dialplan_id is a weak reference: no foreign key, may point nowhere.
CREATE TABLE IF NOT EXISTS ring_groups (
    ring_group_id       TEXT PRIMARY KEY,
    domain_id           TEXT NOT NULL REFERENCES domains(domain_id),
    name                TEXT NOT NULL,
    extension           TEXT NOT NULL,
    description         TEXT,
    enabled             INTEGER NOT NULL DEFAULT 1,
    strategy            TEXT NOT NULL DEFAULT 'sequential',
    ringback            TEXT NOT NULL DEFAULT '${us-ring}',
    caller_id_name      TEXT,
    caller_id_number    TEXT,
    cid_name_prefix     TEXT,
    cid_number_prefix   TEXT,
    distinctive_ring    TEXT,
    missed_call_app     TEXT,
    missed_call_data    TEXT,
    call_timeout        INTEGER NOT NULL DEFAULT 30,
    timeout_data        TEXT NOT NULL DEFAULT 'hangup',
    forward_enabled     INTEGER NOT NULL DEFAULT 0,
    forward_destination TEXT,
    forward_toll_allow  TEXT,
    follow_me_enabled   INTEGER NOT NULL DEFAULT 0,
    greeting            TEXT,
    dialplan_id         TEXT
);

CREATE TABLE IF NOT EXISTS ring_group_destinations (
    destination_id  TEXT PRIMARY KEY,
    ring_group_id   TEXT NOT NULL REFERENCES ring_groups(ring_group_id) ON DELETE CASCADE,
    number          TEXT NOT NULL,
    sequence        INTEGER NOT NULL DEFAULT 0,
    timeout         INTEGER NOT NULL DEFAULT 30,
    delay           INTEGER NOT NULL DEFAULT 0,
    prompt          INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS default_settings (
    category     TEXT NOT NULL,
    subcategory  TEXT NOT NULL,
    value        TEXT NOT NULL,
    PRIMARY KEY (category, subcategory)
);

CREATE INDEX IF NOT EXISTS extensions_domain_idx  ON extensions(domain_id);
CREATE INDEX IF NOT EXISTS ring_groups_domain_idx ON ring_groups(domain_id);
CREATE INDEX IF NOT EXISTS rgd_ring_group_idx     ON ring_group_destinations(ring_group_id);

PRAGMA user_version = 1;
";
