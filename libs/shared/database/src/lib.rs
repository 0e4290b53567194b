pub mod error;
pub mod query;
pub mod supabase;

pub use error::StoreError;
pub use query::{Direction, Filter, TableQuery};
pub use supabase::SupabaseClient;
