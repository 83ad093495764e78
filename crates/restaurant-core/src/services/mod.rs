//! Services shared by the page and worker contexts

mod local_store;

pub use local_store::LocalStore;
