mod http;
mod name;
mod protocol;

pub use http::{DocumentParser, HttpDocumentParser};
pub use name::{DocumentName, DocumentUpload};
pub use protocol::{DocumentStats, ParseResponse, ParsedDocument};
