mod config_cmd;
mod food;

pub use config_cmd::ConfigCommand;
pub use food::FoodCommand;
