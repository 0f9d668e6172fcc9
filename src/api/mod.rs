pub mod admin;
pub mod health;
pub mod middleware;
pub mod redirect;

pub use admin::{AdminService, admin_routes};
pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes, verify_rate_limiter};
