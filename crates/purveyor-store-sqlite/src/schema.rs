//! SQL schema for the Purveyor SQLite store.
//!
//! Executed once at connection startup. Table and column names follow the
//! existing supplier database and must match the `DetailSchema` constants in
//! `purveyor-core`; future migrations will be gated on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS Users (
    UserID       INTEGER PRIMARY KEY AUTOINCREMENT,
    UserName     TEXT NOT NULL UNIQUE,
    PasswordHash TEXT NOT NULL,    -- argon2id PHC string; salt included
    UserRole     TEXT NOT NULL,    -- 'Administrator' | 'Staff'
    Status       TEXT NOT NULL DEFAULT 'Active'
);

CREATE TABLE IF NOT EXISTS Suppliers (
    SupplierID  INTEGER PRIMARY KEY AUTOINCREMENT,
    TIN         TEXT NOT NULL,
    CompanyName TEXT NOT NULL,
    DateCreated TEXT NOT NULL,     -- RFC 3339 UTC; server-assigned
    DateUpdated TEXT NOT NULL,
    Status      TEXT NOT NULL DEFAULT 'Active',
    Version     INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS SupplierAddresses (
    AddressID        INTEGER PRIMARY KEY AUTOINCREMENT,
    SupplierID       INTEGER NOT NULL REFERENCES Suppliers(SupplierID),
    IsPrimary        INTEGER NOT NULL DEFAULT 0,
    AddressLine1     TEXT NOT NULL,
    AddressLine2     TEXT,
    CityMunicipality TEXT NOT NULL,
    Province         TEXT NOT NULL,
    PostalCode       TEXT,
    AddressType      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS SupplierContactNumbers (
    ContactNumberID INTEGER PRIMARY KEY AUTOINCREMENT,
    SupplierID      INTEGER NOT NULL REFERENCES Suppliers(SupplierID),
    IsPrimary       INTEGER NOT NULL DEFAULT 0,
    ContactNumber   TEXT NOT NULL,
    NumberType      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS SupplierEmails (
    EmailID    INTEGER PRIMARY KEY AUTOINCREMENT,
    SupplierID INTEGER NOT NULL REFERENCES Suppliers(SupplierID),
    IsPrimary  INTEGER NOT NULL DEFAULT 0,
    Email      TEXT NOT NULL,
    EmailType  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS SupplierContactPersons (
    ContactPersonID INTEGER PRIMARY KEY AUTOINCREMENT,
    SupplierID      INTEGER NOT NULL REFERENCES Suppliers(SupplierID),
    IsPrimary       INTEGER NOT NULL DEFAULT 0,
    FirstName       TEXT NOT NULL,
    LastName        TEXT NOT NULL,
    Position        TEXT,
    Email           TEXT,
    ContactNumber   TEXT,
    Status          TEXT NOT NULL DEFAULT 'Active'
);

-- At most one primary record per supplier and detail kind.
CREATE UNIQUE INDEX IF NOT EXISTS SupplierAddresses_primary_idx
    ON SupplierAddresses(SupplierID) WHERE IsPrimary = 1;
CREATE UNIQUE INDEX IF NOT EXISTS SupplierContactNumbers_primary_idx
    ON SupplierContactNumbers(SupplierID) WHERE IsPrimary = 1;
CREATE UNIQUE INDEX IF NOT EXISTS SupplierEmails_primary_idx
    ON SupplierEmails(SupplierID) WHERE IsPrimary = 1;
CREATE UNIQUE INDEX IF NOT EXISTS SupplierContactPersons_primary_idx
    ON SupplierContactPersons(SupplierID) WHERE IsPrimary = 1;

CREATE INDEX IF NOT EXISTS SupplierAddresses_supplier_idx
    ON SupplierAddresses(SupplierID);
CREATE INDEX IF NOT EXISTS SupplierContactNumbers_supplier_idx
    ON SupplierContactNumbers(SupplierID);
CREATE INDEX IF NOT EXISTS SupplierEmails_supplier_idx
    ON SupplierEmails(SupplierID);
CREATE INDEX IF NOT EXISTS SupplierContactPersons_supplier_idx
    ON SupplierContactPersons(SupplierID);

PRAGMA user_version = 1;
";
