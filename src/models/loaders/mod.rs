pub mod delimited_loader;

pub use delimited_loader::{load_records, InputFile};
