mod root;
pub use root::{parse, Command, GlobalOptions, KvseedCommand};

pub mod probe;
pub mod seed;
