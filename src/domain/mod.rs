pub mod feed;
pub mod item;
pub mod page;

pub use feed::FeedChannel;
pub use item::FeedItem;
pub use page::{Created, Page, SitemapEntry, StoryFragment};
