pub mod balance;
pub mod replication;
