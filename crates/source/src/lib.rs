pub mod backend;
pub mod cloudwatch;
pub mod event;
pub mod file;
pub mod source;

pub use backend::Backend;
pub use cloudwatch::CloudWatchSource;
pub use event::{RawEvent, parse_event};
pub use file::FileSource;
pub use source::{EventQuery, Fetcher, LogSource};
