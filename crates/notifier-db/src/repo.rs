//! Store-backed implementations of the core collaborator traits.

pub mod content;
pub mod eligibility;
pub mod run_lock;
pub mod tenant;
pub mod trending;

pub use content::PgContentLookup;
pub use eligibility::PgEligibilityIndex;
pub use run_lock::PgRunLock;
pub use tenant::PgTenantRegistry;
pub use trending::{PgTrendingIndex, TrendingRow};
