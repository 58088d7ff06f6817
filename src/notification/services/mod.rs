//! Service layer for the notification feed.

mod feed;

pub use feed::{NotificationFeedError, NotificationFeedResult, NotificationFeedService};
