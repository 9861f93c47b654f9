pub mod admin;
pub mod draw;
pub mod prize;
pub mod ticket;
pub mod views;

pub use views::RoundSnapshot;
