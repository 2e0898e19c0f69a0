pub mod categories;
pub mod order_statuses;
pub mod orders;
pub mod password_reset_tokens;
pub mod token_blacklist;
pub mod users;
