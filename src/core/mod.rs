mod key;
pub use self::key::{relative_directory, StoreKey, SEPARATOR};

mod walk;
pub use self::walk::Walk;

pub mod parse;

mod probe;
pub use self::probe::{HttpProbe, Probe, ProbeError};

mod retry;
pub use self::retry::{RetryConnector, Unreachable};

mod gate;
pub use self::gate::{should_import, Decision};

mod import;
pub use self::import::{ImportOptions, ImportSummary, TreeImporter};
