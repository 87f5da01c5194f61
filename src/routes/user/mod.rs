mod handler;
mod model;

pub use handler::{list_users, login, signup, update_profile};
pub use model::{LoginResponse, SuccessResponse, UpdateProfileRequest, UserSummary, UsersResponse};
