pub mod mailbox;
pub mod report;
pub mod worker;
