//! Core domain types and traits for the push notification scheduler.
//!
//! This crate contains:
//! - Tenant, user and content identifiers
//! - Time window bucketing
//! - Trending and eligibility lookups
//! - Dispatch jobs and the sink they are handed to
//! - Content selection policies

pub mod content;
pub mod dispatch;
pub mod eligibility;
pub mod error;
pub mod id;
pub mod selection;
pub mod tenant;
pub mod time_window;
pub mod trending;

pub use content::{Content, ContentLookup};
pub use dispatch::{DispatchJob, DispatchSink, RunLease, RunLock};
pub use eligibility::EligibilityIndex;
pub use error::{Error, Result};
pub use id::{ContentId, TenantId, UserId};
pub use selection::{ContentSelector, RankWeightedSelector, SelectionPolicy, UniformSelector};
pub use tenant::TenantRegistry;
pub use time_window::{TimeParts, ceil, decompose, floor, utc_offset};
pub use trending::{TrendingEntry, TrendingIndex, TrendingList};
