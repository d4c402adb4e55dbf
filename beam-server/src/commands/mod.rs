pub mod orchestration;
pub mod resource;
