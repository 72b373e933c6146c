//! Service layer for the sync engine.
//!
//! This module contains the building blocks of a reconciliation run:
//! - Feed retrieval and parsing (`FeedClient`)
//! - Category code translation (`CategoryMapper`)
//! - External id to local record lookup (`IdentityIndex`)
//! - Hand-edit detection (`was_edited`)

mod categories;
mod changes;
mod feed;
mod identity;

pub use categories::CategoryMapper;
pub use changes::was_edited;
pub use feed::{FeedClient, FeedSource, parse_feed};
pub use identity::IdentityIndex;
