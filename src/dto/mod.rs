pub mod candidate_dto;
pub mod interview_dto;
pub mod interviewer_dto;
pub mod requirement_dto;
pub mod ticket_dto;
