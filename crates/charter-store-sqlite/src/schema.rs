//! SQL schema for the Charter SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS requests (
    request_id            TEXT PRIMARY KEY,
    name                  TEXT,
    category              TEXT,
    code                  TEXT,
    expected_members      INTEGER,
    objectives            TEXT,
    contact_channels      TEXT,
    status                TEXT NOT NULL CHECK (status IN (
        'draft', 'submitted',
        'contact_confirmation_pending', 'contact_confirmed',
        'contact_rejected', 'name_revision_required',
        'proposal_required', 'proposal_submitted',
        'proposal_rejected', 'proposal_approved',
        'defense_schedule_proposed', 'defense_schedule_approved',
        'defense_schedule_rejected', 'defense_completed',
        'final_form_submitted', 'approved', 'rejected'
    )),
    created_by            TEXT NOT NULL,
    assigned_reviewer     TEXT,
    created_at            TEXT NOT NULL,
    received_at           TEXT,
    confirmation_deadline TEXT,
    confirmed_at          TEXT,
    decided_at            TEXT
);

-- Document versions are strictly append-only.
-- No UPDATE is ever issued against this table; rows die with the request.
CREATE TABLE IF NOT EXISTS documents (
    document_id  TEXT PRIMARY KEY,
    request_id   TEXT NOT NULL REFERENCES requests(request_id),
    kind         TEXT NOT NULL CHECK (kind IN ('proposal', 'final_form')),
    seq          INTEGER NOT NULL,
    title        TEXT NOT NULL,
    document_url TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    UNIQUE (request_id, kind, seq)
);

-- At most one schedule per request; mutable until confirmed.
CREATE TABLE IF NOT EXISTS defense_schedules (
    request_id   TEXT PRIMARY KEY REFERENCES requests(request_id),
    starts_at    TEXT NOT NULL,
    ends_at      TEXT NOT NULL,
    location     TEXT NOT NULL,
    meeting_link TEXT,
    notes        TEXT,
    result       TEXT CHECK (result IN ('proposed', 'confirmed', 'passed', 'failed')),
    feedback     TEXT,
    updated_at   TEXT NOT NULL
);

-- One row per successful transition; never mutated or deleted.
CREATE TABLE IF NOT EXISTS audit_log (
    entry_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id  TEXT NOT NULL REFERENCES requests(request_id),
    actor_id    TEXT NOT NULL,
    action      TEXT NOT NULL,
    comment     TEXT,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS clubs (
    club_id          TEXT PRIMARY KEY,
    request_id       TEXT NOT NULL UNIQUE REFERENCES requests(request_id),
    name             TEXT NOT NULL UNIQUE,
    category         TEXT NOT NULL,
    code             TEXT,
    expected_members INTEGER NOT NULL,
    objectives       TEXT,
    founded_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS club_roles (
    role_id     TEXT PRIMARY KEY,
    club_id     TEXT NOT NULL REFERENCES clubs(club_id),
    name        TEXT NOT NULL,
    level       INTEGER NOT NULL,
    category_id TEXT,
    UNIQUE (club_id, name)
);

CREATE TABLE IF NOT EXISTS club_memberships (
    membership_id TEXT PRIMARY KEY,
    club_id       TEXT NOT NULL REFERENCES clubs(club_id),
    user_id       TEXT NOT NULL,
    status        TEXT NOT NULL CHECK (status IN ('active', 'inactive')),
    joined_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS role_assignments (
    assignment_id TEXT PRIMARY KEY,
    membership_id TEXT NOT NULL REFERENCES club_memberships(membership_id),
    role_id       TEXT NOT NULL REFERENCES club_roles(role_id),
    term_id       TEXT NOT NULL,
    term_name     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS requests_status_idx    ON requests(status);
CREATE INDEX IF NOT EXISTS requests_owner_idx     ON requests(created_by);
CREATE INDEX IF NOT EXISTS documents_request_idx  ON documents(request_id, kind);
CREATE INDEX IF NOT EXISTS audit_request_idx      ON audit_log(request_id);

PRAGMA user_version = 1;
";
