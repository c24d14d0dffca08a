pub mod calc;
pub mod history;
pub mod save;
pub mod setup;
pub mod ui;
