//! End-to-end tests. The `pgsql` suite needs a reachable PostgreSQL and is
//! `#[ignore]`d by default: run it with `cargo test -- --ignored` after
//! setting `DBSD_SOURCE__*` (or `env/.env`).

#[cfg(test)]
mod discovery;
#[cfg(test)]
mod pgsql;
