pub mod browser;
pub mod crawler;
pub mod flatmates;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use browser::ChromePageSource;
pub use crawler::FlatmatesCrawler;
