pub mod author_client;

pub use author_client::AuthorClient;
