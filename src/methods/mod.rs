// Numerical methods

pub mod adaptive;
pub mod fixed;
pub mod settings;
pub mod stage;
pub mod tableau;
