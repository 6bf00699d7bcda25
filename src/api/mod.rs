pub mod client;

pub use client::{GitlabClient, MalformedRecord, ProjectPage};
