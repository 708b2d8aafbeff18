pub mod guild;
pub mod ranking;
