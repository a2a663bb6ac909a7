pub mod member;
pub mod reader;

pub use member::{Event, MemberAttributes, MemberRecord, RecordSet};
pub use reader::EventLogReader;
