#[cfg(test)]
pub mod appointment;
#[cfg(test)]
pub mod availability;
#[cfg(test)]
pub mod error_test;
#[cfg(test)]
pub mod plan;
