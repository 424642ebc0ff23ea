pub mod alerting;
pub mod db;
pub mod monitoring;
pub mod notifications;
pub mod server;
pub mod sweep;
pub mod version;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
