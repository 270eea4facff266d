use loghook_core::error::Result;

use crate::cloudwatch::CloudWatchSource;
use crate::event::RawEvent;
use crate::file::FileSource;
use crate::source::{EventQuery, LogSource};

/// Log store selected at startup.
pub enum Backend {
    CloudWatch(CloudWatchSource),
    File(FileSource),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CloudWatch(_) => "cloudwatch",
            Self::File(_) => "file",
        }
    }
}

impl LogSource for Backend {
    async fn fetch(&self, query: &EventQuery) -> Result<Vec<RawEvent>> {
        match self {
            Self::CloudWatch(source) => source.fetch(query).await,
            Self::File(source) => source.fetch(query).await,
        }
    }
}
