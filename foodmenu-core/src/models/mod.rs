mod food;
mod food_id;

pub use food::Food;
pub use food_id::FoodId;
