pub mod candidate;
pub mod interview;
pub mod interviewer;
pub mod requirement;
pub mod session;
pub mod ticket;
