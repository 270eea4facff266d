pub mod deliver;
pub mod format;
pub mod relay;
pub mod table;

pub use deliver::{ConsoleSink, PayloadSink, WebhookSink};
pub use format::format_payload;
pub use relay::{Destination, Relay, RelaySettings, RunSummary};
pub use table::{TableRow, render_csv};
