pub mod bot;
pub mod store;

pub use bot::{BotSummary, CookieBot};
pub use store::{choose_purchase, StoreItem};
