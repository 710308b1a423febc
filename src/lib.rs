pub mod auth;
pub mod rate_limit;
pub mod resilient_client;
pub mod routes;
pub mod store;
pub mod user_directory;
pub mod user_harvester;
pub mod user_quality_filter;
pub mod user_record;

#[cfg(test)]
mod tests;

pub use auth::{CredentialVerifier, EnvCredentials, JwtConfig, StaticCredentials};
pub use rate_limit::{RateLimitConfig, RateLimitGuard};
pub use resilient_client::{FailureClass, ResilientClient, RetryPolicy, RetrySchedule};
pub use routes::build_router;
pub use user_directory::UserDirectory;
pub use user_harvester::{HarvestConfig, UserHarvester};
pub use user_quality_filter::{PipelineSummary, QualityFilterConfig};
pub use user_record::{FilteredUser, UserRecord};
