mod handler;

pub use handler::{ban, login};
