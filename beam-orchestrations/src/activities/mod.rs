pub mod remote_action;
