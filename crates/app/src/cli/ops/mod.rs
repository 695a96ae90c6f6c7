pub mod init;
pub mod open;
pub mod request;
pub mod send;
pub mod version;

pub use init::Init;
pub use open::Open;
pub use request::Request;
pub use send::SendSecret;
pub use version::Version;
