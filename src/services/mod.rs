pub mod candidate_service;
pub mod dashboard_service;
pub mod interview_service;
pub mod interviewer_service;
pub mod notification_service;
pub mod requirement_service;
pub mod ticket_service;
