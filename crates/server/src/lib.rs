pub mod errors;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod startup;

pub use startup::run;
