mod category;
mod order;
mod order_status;
mod password_reset_token;
mod user;

pub use category::Category;
pub use order::Order;
pub use order_status::OrderStatus;
pub use password_reset_token::PasswordResetToken;
pub use user::User;
