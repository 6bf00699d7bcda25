pub mod project;

pub use project::{RemoteNamespace, RemoteProject, Visibility};
