//! Concrete [`DomBackend`](crate::dom::DomBackend) implementations.

pub mod mock;
pub mod webdriver;

pub use mock::{el, MockDom, NodeSpec};
pub use webdriver::WebDriverBackend;
