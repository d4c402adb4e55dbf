#![allow(dead_code)]

pub mod mock_ace;
pub mod scripted_actions;

pub use mock_ace::*;
pub use scripted_actions::*;

use beam_models::ResourceDescriptor;

pub fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new("base-model", "app1")
        .with_domain("app1.example.com")
        .with_placement("eu-west", "aws")
        .with_param("size=small")
}
