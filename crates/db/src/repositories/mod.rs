//! Repository layer: one zero-sized struct per table, each taking an executor.

pub mod column_repo;
pub mod tag_repo;
pub mod task_repo;

pub use column_repo::ColumnRepo;
pub use tag_repo::TagRepo;
pub use task_repo::TaskRepo;
