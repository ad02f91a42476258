//! SQL schema for the parish SQLite store.
//!
//! Executed once at connection startup; `PRAGMA user_version` records the
//! schema generation for future migrations.
//!
//! Dates are `YYYY-MM-DD` text, timestamps RFC 3339 UTC with microseconds,
//! money is decimal text summed in Rust, UUIDs are hyphenated lowercase.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Configuration registry ──────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS years (
    id           TEXT PRIMARY KEY,
    year         INTEGER NOT NULL UNIQUE CHECK (year BETWEEN 2020 AND 2080),
    is_current   INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL
);

-- At most one current year; the store keeps it at exactly one.
CREATE UNIQUE INDEX IF NOT EXISTS years_single_current
    ON years(is_current) WHERE is_current = 1;

CREATE TABLE IF NOT EXISTS outstations (
    id           TEXT PRIMARY KEY,
    number       INTEGER NOT NULL UNIQUE,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    location     TEXT NOT NULL,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cells (
    id            TEXT PRIMARY KEY,
    number        INTEGER NOT NULL UNIQUE,
    name          TEXT NOT NULL UNIQUE,
    outstation_id TEXT NOT NULL REFERENCES outstations(id) ON DELETE CASCADE,
    description   TEXT,
    location      TEXT NOT NULL,
    date_created  TEXT NOT NULL,
    date_updated  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS church_locations (
    id           TEXT PRIMARY KEY,
    latitude     REAL NOT NULL,
    longitude    REAL NOT NULL,
    altitude     REAL,
    is_active    INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS church_locations_single_active
    ON church_locations(is_active) WHERE is_active = 1;

-- ── Identity store and sacrament ledger ─────────────────────────────────

CREATE TABLE IF NOT EXISTS members (
    id                       TEXT PRIMARY KEY,
    member_id                TEXT NOT NULL UNIQUE,
    status                   TEXT NOT NULL DEFAULT 'Pending',
    full_name                TEXT NOT NULL,
    date_of_birth            TEXT NOT NULL,
    gender                   TEXT NOT NULL,
    phone_number             TEXT NOT NULL UNIQUE,
    email                    TEXT,
    address                  TEXT,
    cell_id                  TEXT REFERENCES cells(id) ON DELETE SET NULL,
    is_baptised              INTEGER NOT NULL DEFAULT 0,
    date_of_baptism          TEXT,
    is_confirmed             INTEGER NOT NULL DEFAULT 0,
    date_confirmed           TEXT,
    marital_status           TEXT NOT NULL DEFAULT 'Single',
    date_of_marriage         TEXT,
    baptism_certificate      TEXT,
    confirmation_certificate TEXT,
    is_leader                INTEGER NOT NULL DEFAULT 0,
    emergency_contact_name   TEXT,
    emergency_contact_phone  TEXT,
    passport                 TEXT,
    date_created             TEXT NOT NULL,
    CHECK (is_confirmed = 0 OR is_baptised = 1),
    CHECK (marital_status != 'Married' OR (date_of_marriage IS NOT NULL AND is_confirmed = 1))
);

CREATE INDEX IF NOT EXISTS members_cell_idx ON members(cell_id);

-- A marriage between two registered members; each member is in at most one.
CREATE TABLE IF NOT EXISTS marriages (
    id           TEXT PRIMARY KEY,
    husband_id   TEXT NOT NULL UNIQUE REFERENCES members(id) ON DELETE CASCADE,
    wife_id      TEXT NOT NULL UNIQUE REFERENCES members(id) ON DELETE CASCADE,
    married_on   TEXT NOT NULL,
    date_created TEXT NOT NULL,
    CHECK (husband_id != wife_id)
);

-- ── Leader registry ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS leaders (
    id               TEXT PRIMARY KEY,
    leader_id        TEXT NOT NULL UNIQUE,
    church_member_id TEXT NOT NULL UNIQUE REFERENCES members(id) ON DELETE CASCADE,
    occupation       TEXT NOT NULL,
    start_date       TEXT NOT NULL,
    responsibilities TEXT NOT NULL,
    time_in_service  TEXT,
    outstation_id    TEXT REFERENCES outstations(id) ON DELETE SET NULL,
    date_created     TEXT NOT NULL,
    CHECK (occupation != 'Evangelist' OR outstation_id IS NOT NULL)
);

-- ── Asset registry ──────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS assets (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    asset_type       TEXT NOT NULL,
    description      TEXT,
    acquisition_date TEXT,
    quantity         INTEGER NOT NULL DEFAULT 1,
    quantity_name    TEXT NOT NULL,
    status           TEXT NOT NULL,
    value            TEXT NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS asset_media (
    id          TEXT PRIMARY KEY,
    asset_id    TEXT NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    image       TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);

-- ── Finance ledger ──────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS offering_categories (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS offerings (
    id            TEXT PRIMARY KEY,
    year_id       TEXT NOT NULL REFERENCES years(id) ON DELETE RESTRICT,
    date_given    TEXT NOT NULL,
    service_time  TEXT NOT NULL,
    amount        TEXT NOT NULL,
    collected_by  TEXT REFERENCES members(id) ON DELETE SET NULL,
    recorded_by   TEXT REFERENCES members(id) ON DELETE SET NULL,
    mass_name     TEXT NOT NULL,
    notes         TEXT,
    category_id   TEXT NOT NULL REFERENCES offering_categories(id) ON DELETE CASCADE,
    outstation_id TEXT NOT NULL REFERENCES outstations(id) ON DELETE RESTRICT,
    date_created  TEXT NOT NULL,
    date_updated  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS offerings_date_idx ON offerings(date_given);

CREATE TABLE IF NOT EXISTS facility_rentings (
    id           TEXT PRIMARY KEY,
    year_id      TEXT NOT NULL REFERENCES years(id) ON DELETE RESTRICT,
    asset_id     TEXT NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
    rentor_name  TEXT NOT NULL,
    amount       TEXT NOT NULL,
    date_rented  TEXT NOT NULL,
    end_date     TEXT,
    purpose      TEXT,
    receipt_id   TEXT NOT NULL UNIQUE,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS special_contributions (
    id                TEXT PRIMARY KEY,
    contribution_type TEXT NOT NULL,
    name              TEXT NOT NULL UNIQUE,
    description       TEXT,
    date_created      TEXT NOT NULL,
    date_updated      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS donation_item_funds (
    id              TEXT PRIMARY KEY,
    contribution_id TEXT NOT NULL REFERENCES special_contributions(id) ON DELETE CASCADE,
    year_id         TEXT NOT NULL REFERENCES years(id) ON DELETE RESTRICT,
    period          TEXT NOT NULL,
    mass_name       TEXT NOT NULL,
    amount          TEXT NOT NULL,
    notes           TEXT,
    date_created    TEXT NOT NULL,
    date_updated    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pledges (
    id                      TEXT PRIMARY KEY,
    member_id               TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    year_id                 TEXT NOT NULL REFERENCES years(id) ON DELETE RESTRICT,
    month                   TEXT NOT NULL,
    date_given              TEXT NOT NULL,
    envelope_number         TEXT NOT NULL,
    pledge_amount           TEXT NOT NULL,
    pledge_for_construction TEXT NOT NULL,
    date_created            TEXT NOT NULL,
    date_updated            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expense_categories (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    description  TEXT,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expenditures (
    id                  TEXT PRIMARY KEY,
    category_id         TEXT NOT NULL REFERENCES expense_categories(id) ON DELETE CASCADE,
    year_id             TEXT NOT NULL REFERENCES years(id) ON DELETE RESTRICT,
    month               TEXT NOT NULL,
    date_taken          TEXT NOT NULL,
    expenditure_amount  TEXT NOT NULL,
    expenditure_purpose TEXT,
    notes               TEXT,
    receipt             TEXT,
    date_created        TEXT NOT NULL,
    date_updated        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS expenditures_taken_idx ON expenditures(date_taken);

-- ── Notifications ───────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS notifications (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    message      TEXT NOT NULL,
    recipient_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    is_read      INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sent_sms (
    id           TEXT PRIMARY KEY,
    recipient_id TEXT REFERENCES members(id) ON DELETE CASCADE,
    phone_number TEXT NOT NULL,
    message      TEXT NOT NULL,
    request_id   TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'PENDING',
    sent_at      TEXT NOT NULL
);

PRAGMA user_version = 1;
";
