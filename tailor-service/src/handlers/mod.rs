pub mod bills;
pub mod dashboard;
pub mod health;
pub mod settings;
pub mod workflow;
