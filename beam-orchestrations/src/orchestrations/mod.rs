pub mod decommission_resource;
pub mod driver;
pub mod provision_resource;
