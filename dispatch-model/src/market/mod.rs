pub mod price;

pub use price::{PricePoint, PriceSeries};
