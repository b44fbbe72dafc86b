pub mod backtest;
pub mod forecast;
pub mod summary;
pub mod timeline;
