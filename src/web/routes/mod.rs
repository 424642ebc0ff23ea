pub mod check_routes;
pub mod cron_routes;
pub mod monitor_routes;
pub mod notify_routes;
