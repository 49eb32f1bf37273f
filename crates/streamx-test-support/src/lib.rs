//! Shared test mocks, fixtures and mock-server responses for the StreamX
//! ingestion client.

mod clock;
mod comparator;
mod fixtures;
mod requester;
pub mod streamx_response;
mod transport;

pub use clock::FixedClock;
pub use comparator::{assert_same_event_lists, assert_same_events};
pub use fixtures::{
    FIXTURE_TIME_SECS, GENERIC_EVENT_TYPE, PAGE_PUBLISHED_TYPE, PAGE_UNPUBLISHED_TYPE, event,
    event_of_type, page_publish_event, page_unpublish_event,
};
pub use requester::{PathRewritingRequester, RecordedPost, StaticRequester};
pub use transport::{FailingTransport, RecordingTransport, StubResponse};
