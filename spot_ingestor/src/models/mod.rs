pub mod area;
pub mod fragment;
pub mod price_point;
