//! Persistence layer: SQLite via sqlx, one repository per entity.

pub mod db;
pub mod repositories;

pub use db::DbConnection;
pub use repositories::{
    DisbursementRepository, DonorRepository, EventRepository, MutationRepository,
    ProfileRepository, TransactionRepository,
};
