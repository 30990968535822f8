mod controller;
mod state;

pub use controller::{NavigationController, NavigationOutcome, StartMode};
pub use state::NavigationState;
