/// Build version, overridable at compile time through `UPTIMEGUARD_VERSION`.
pub const VERSION: &str = match option_env!("UPTIMEGUARD_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
