pub mod normalize;
pub mod time;
pub mod validation;
