//! Database layer (Supabase PostgREST).

pub mod memory;
pub mod store;
pub mod supabase;

pub use memory::MemoryDb;
pub use store::{
    ActivityFilter, ActivityStore, CredentialStore, MetricFilter, MetricStore, ProfileStore,
};
pub use supabase::SupabaseDb;

/// Table names as constants.
pub mod tables {
    pub const CREDENTIALS: &str = "strava_users";
    pub const ACTIVITIES: &str = "strava_activities";
    pub const METRICS: &str = "training_metrics";
    /// Read-only here; owned by the profile-management side of the dashboard.
    pub const PROFILES: &str = "athlete_profiles";
}
