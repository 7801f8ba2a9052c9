pub mod appointment;
pub mod availability;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod clock;
pub mod employee;
pub mod permission;
pub mod plan;
pub mod qualification;
pub mod random;
pub mod sale;
pub mod uuid_service;

mod test;
