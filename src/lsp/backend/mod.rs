mod handlers;
mod state;

pub use state::Backend;
