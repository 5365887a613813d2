//! SQL schema for the statpub SQLite store.
//!
//! [`SCHEMA`] runs at every connection startup. [`SEED`] runs only when
//! `PRAGMA user_version` is still 0, i.e. for a new database, so deleted
//! reference rows stay deleted.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS themes (
    theme_id    TEXT PRIMARY KEY,
    slug        TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    summary     TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS topics (
    topic_id    TEXT PRIMARY KEY,
    theme_id    TEXT NOT NULL REFERENCES themes(theme_id) ON DELETE CASCADE,
    slug        TEXT NOT NULL,
    title       TEXT NOT NULL,
    summary     TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    UNIQUE (theme_id, slug)
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id    TEXT PRIMARY KEY,
    team_name     TEXT NOT NULL,
    team_email    TEXT NOT NULL,
    contact_name  TEXT NOT NULL,
    contact_phone TEXT
);

CREATE TABLE IF NOT EXISTS methodologies (
    methodology_id TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    summary        TEXT NOT NULL DEFAULT '',
    content        TEXT NOT NULL,   -- versioned content document
    annexes        TEXT NOT NULL,   -- versioned content document
    published_at   TEXT,
    updated_at     TEXT NOT NULL
);

-- Contact and methodology are shared: deleting one that is still referenced
-- must fail until the reference is cleared.
CREATE TABLE IF NOT EXISTS publications (
    publication_id TEXT PRIMARY KEY,
    topic_id       TEXT NOT NULL REFERENCES topics(topic_id) ON DELETE CASCADE,
    slug           TEXT NOT NULL UNIQUE,
    title          TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT '',
    summary        TEXT NOT NULL DEFAULT '',
    data_source    TEXT NOT NULL DEFAULT '',
    next_update    TEXT,            -- YYYY-MM-DD or NULL
    contact_id     TEXT REFERENCES contacts(contact_id) ON DELETE RESTRICT,
    methodology_id TEXT REFERENCES methodologies(methodology_id) ON DELETE RESTRICT
);

CREATE TABLE IF NOT EXISTS links (
    link_id        TEXT PRIMARY KEY,
    publication_id TEXT NOT NULL REFERENCES publications(publication_id) ON DELETE CASCADE,
    description    TEXT NOT NULL,
    url            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS release_types (
    release_type_id TEXT PRIMARY KEY,
    title           TEXT NOT NULL UNIQUE
);

-- Visible metadata (name, slug, summary, schedule, type, coverage) is not
-- stored here; it lives on release_summary_versions.
CREATE TABLE IF NOT EXISTS releases (
    release_id     TEXT PRIMARY KEY,
    publication_id TEXT NOT NULL REFERENCES publications(publication_id) ON DELETE CASCADE,
    display_order  INTEGER NOT NULL,
    status         TEXT NOT NULL DEFAULT 'Draft'
                   CHECK (status IN ('Draft', 'HigherLevelReview', 'Approved', 'Published')),
    content        TEXT NOT NULL,   -- versioned content document
    key_statistics TEXT,            -- versioned data block document or NULL
    release_note   TEXT,
    created_at     TEXT NOT NULL,
    published_at   TEXT
);

CREATE TABLE IF NOT EXISTS release_summaries (
    summary_id TEXT PRIMARY KEY,
    release_id TEXT NOT NULL UNIQUE REFERENCES releases(release_id) ON DELETE CASCADE
);

-- Versions are strictly append-only: rows are only ever removed by cascade
-- from their release.
CREATE TABLE IF NOT EXISTS release_summary_versions (
    sequence             INTEGER PRIMARY KEY AUTOINCREMENT,
    version_id           TEXT NOT NULL UNIQUE,
    summary_id           TEXT NOT NULL REFERENCES release_summaries(summary_id) ON DELETE CASCADE,
    created_at           TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    release_name         TEXT NOT NULL,
    slug                 TEXT NOT NULL,
    summary              TEXT NOT NULL DEFAULT '',
    publish_scheduled    TEXT,
    release_type_id      TEXT NOT NULL REFERENCES release_types(release_type_id) ON DELETE RESTRICT,
    time_period_coverage TEXT NOT NULL CHECK (length(time_period_coverage) <= 6),
    next_release_date    TEXT
);

CREATE TRIGGER IF NOT EXISTS release_summary_versions_append_only
BEFORE UPDATE ON release_summary_versions
BEGIN
    SELECT RAISE(ABORT, 'release summary versions are append-only');
END;

-- Cascades run after the parent row is gone, so only direct deletes match.
CREATE TRIGGER IF NOT EXISTS release_summary_versions_no_delete
BEFORE DELETE ON release_summary_versions
WHEN EXISTS (SELECT 1 FROM release_summaries WHERE summary_id = OLD.summary_id)
BEGIN
    SELECT RAISE(ABORT, 'release summary versions are append-only');
END;

-- Post-publication corrections; append-only.
CREATE TABLE IF NOT EXISTS updates (
    update_id  TEXT PRIMARY KEY,
    release_id TEXT NOT NULL REFERENCES releases(release_id) ON DELETE CASCADE,
    on_date    TEXT NOT NULL,       -- YYYY-MM-DD
    reason     TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS updates_append_only
BEFORE UPDATE ON updates
BEGIN
    SELECT RAISE(ABORT, 'release updates are append-only');
END;

CREATE TRIGGER IF NOT EXISTS updates_no_delete
BEFORE DELETE ON updates
WHEN EXISTS (SELECT 1 FROM releases WHERE release_id = OLD.release_id)
BEGIN
    SELECT RAISE(ABORT, 'release updates are append-only');
END;

CREATE INDEX IF NOT EXISTS topics_theme_idx             ON topics(theme_id);
CREATE INDEX IF NOT EXISTS publications_topic_idx       ON publications(topic_id);
CREATE INDEX IF NOT EXISTS links_publication_idx        ON links(publication_id);
CREATE INDEX IF NOT EXISTS releases_publication_idx     ON releases(publication_id);
CREATE INDEX IF NOT EXISTS summary_versions_summary_idx ON release_summary_versions(summary_id);
CREATE INDEX IF NOT EXISTS updates_release_idx          ON updates(release_id);

PRAGMA user_version = 1;
";

/// Default reference rows for a new database.
pub const SEED: &str = "
INSERT INTO release_types (release_type_id, title) VALUES
    ('9d333457-9132-4e55-ae78-c55cb3673d7c', 'Official Statistics'),
    ('8becd272-1100-4e33-8a7d-1c0c4e3b42b8', 'National Statistics'),
    ('1821abb8-68b0-431b-9770-0bea65d02ff0', 'Ad Hoc');
";
