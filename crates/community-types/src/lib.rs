pub mod api;
pub mod models;
pub mod packet;
pub mod timestamp;
