pub use super::version::Entity as Version;
