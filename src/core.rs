pub mod extractor;
pub mod fetcher;
pub mod http_client;
pub mod session;
pub mod signer;

pub use fetcher::{FetchedPage, PageFetcher, ReqwestFetcher};
pub use http_client::HttpClient;
pub use session::SessionCookieProvider;
pub use signer::{NodeScriptSigner, Signer};
