pub mod controller;
pub mod state;

pub use controller::FormController;
pub use state::{FormState, Phase};
