mod sqlite_store;

pub use sqlite_store::{ComplaintFilter, ComplaintStore, StatusCounts};
