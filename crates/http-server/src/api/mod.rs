pub mod email;
pub mod inbox;
