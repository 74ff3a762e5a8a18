pub mod disbursement_repository;
pub mod donor_repository;
pub mod event_repository;
pub mod mutation_repository;
pub mod profile_repository;
pub mod transaction_repository;

pub use disbursement_repository::DisbursementRepository;
pub use donor_repository::DonorRepository;
pub use event_repository::EventRepository;
pub use mutation_repository::MutationRepository;
pub use profile_repository::ProfileRepository;
pub use transaction_repository::TransactionRepository;
