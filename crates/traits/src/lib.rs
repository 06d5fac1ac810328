pub mod archive;
pub mod cancel;
pub mod executor;
pub mod store;
pub mod translit;

pub use archive::{Archiver, ArchiveError, InMemoryArchiver, NamedBlob};
pub use cancel::CancelToken;
pub use executor::{Executor, ExecutorError, SyncExecutor};
pub use store::{EntryStore, InMemoryEntryStore, StoreError};
pub use translit::{NoopTransliterator, Scheme, TransliterationError, Transliterator};
