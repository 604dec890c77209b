pub(crate) mod basic;
pub(crate) mod parallel;
pub(crate) mod scrape;
pub(crate) mod sleep;
