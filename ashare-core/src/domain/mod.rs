//! Domain types: stock codes, board classification, daily bars.

pub mod bar;
pub mod code;

pub use bar::DailyBar;
pub use code::{Board, Exchange, InvalidCode, StockCode};
