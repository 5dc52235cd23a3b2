//! Storage adapters for the application ports.
//!
//! One PostgreSQL adapter per port, plus an in-memory store used by the
//! handler tests and for running without a database.

#![forbid(unsafe_code)]

mod in_memory_store;
mod monthly_rows;
mod postgres_activity_repository;
mod postgres_contribution_repository;
mod postgres_cooperative_repository;
mod postgres_expense_repository;
mod postgres_loan_repository;
mod postgres_member_repository;
mod postgres_role_repository;
mod postgres_subject_directory;

pub use in_memory_store::InMemoryStore;
pub use postgres_activity_repository::PostgresActivityRepository;
pub use postgres_contribution_repository::PostgresContributionRepository;
pub use postgres_cooperative_repository::PostgresCooperativeRepository;
pub use postgres_expense_repository::PostgresExpenseRepository;
pub use postgres_loan_repository::PostgresLoanRepository;
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_subject_directory::PostgresSubjectDirectory;
